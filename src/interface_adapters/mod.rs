// Interface adapters: wire protocol, reqwest transport, storage, i18n and shell state.

pub mod api;
pub mod http;
pub mod i18n;
pub mod protocol;
pub mod state;
pub mod storage;
