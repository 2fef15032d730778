// User-facing text. Built-in strings travel as a locale key plus `{name}`
// arguments and are rendered by the translator; user input stays literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
    Literal(String),
    Key {
        key: &'static str,
        args: Vec<(&'static str, String)>,
    },
}

impl Text {
    pub fn key(key: &'static str) -> Self {
        Text::Key {
            key,
            args: Vec::new(),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Text::Literal(text.into())
    }

    // Literal text has no placeholders; the argument is dropped.
    pub fn with_arg(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Text::Key { args, .. } = &mut self {
            args.push((name, value.into()));
        }
        self
    }

    pub fn key_name(&self) -> Option<&'static str> {
        match self {
            Text::Key { key, .. } => Some(key),
            Text::Literal(_) => None,
        }
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        match self {
            Text::Key { args, .. } => args
                .iter()
                .find(|(arg, _)| *arg == name)
                .map(|(_, value)| value.as_str()),
            Text::Literal(_) => None,
        }
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::Literal(text)
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::Literal(text.to_string())
    }
}
