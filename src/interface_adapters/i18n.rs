use std::collections::HashMap;

use crate::domain::text::Text;

const KO_BUNDLE: &str = include_str!("../../locales/ko.toml");
const EN_BUNDLE: &str = include_str!("../../locales/en.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Ko,
    En,
}

impl Locale {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ko" | "ko-kr" | "ko_kr" => Some(Locale::Ko),
            "en" | "en-us" | "en_us" => Some(Locale::En),
            _ => None,
        }
    }
}

// Key lookup over the embedded locale bundles; Korean is the fallback.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    active: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Translator {
    pub fn new(locale: Locale) -> Result<Self, toml::de::Error> {
        let active = match locale {
            Locale::Ko => KO_BUNDLE,
            Locale::En => EN_BUNDLE,
        };
        Self::from_bundles(locale, active, KO_BUNDLE)
    }

    pub(crate) fn from_bundles(
        locale: Locale,
        active: &str,
        fallback: &str,
    ) -> Result<Self, toml::de::Error> {
        Ok(Self {
            locale,
            active: flatten_bundle(active)?,
            fallback: flatten_bundle(fallback)?,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    // Unknown keys render as the key itself.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.active
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    // Lookup with `{name}` style placeholders filled in.
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.t(key).to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }

    // Keyed text is looked up and filled in; literal text is shown verbatim.
    pub fn render(&self, text: &Text) -> String {
        match text {
            Text::Literal(text) => text.clone(),
            Text::Key { key, args } => {
                let args: Vec<(&str, &str)> = args
                    .iter()
                    .map(|(name, value)| (*name, value.as_str()))
                    .collect();
                self.t_with(key, &args)
            }
        }
    }
}

// Nested tables become dot-separated keys.
fn flatten_bundle(raw: &str) -> Result<HashMap<String, String>, toml::de::Error> {
    let table: toml::Table = raw.parse()?;
    let mut out = HashMap::new();
    flatten_into("", &table, &mut out);
    Ok(out)
}

fn flatten_into(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(text) => {
                out.insert(full, text.clone());
            }
            toml::Value::Table(inner) => flatten_into(&full, inner, out),
            other => {
                out.insert(full, other.to_string());
            }
        }
    }
}
