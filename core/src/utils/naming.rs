//! Naming conventions
//!
//! Derives external keys and display titles from physical column names.
//! `user_id` becomes the key `userID` and the title `User ID` with the
//! default settings.

use std::collections::HashSet;

use crate::config::NamingConfig;

/// Converts column names to keys and titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    enabled: bool,
    uppercase_words: HashSet<String>,
}

impl Default for Naming {
    fn default() -> Self {
        Naming::new(&NamingConfig::default())
    }
}

impl Naming {
    /// Build a converter from configuration
    pub fn new(config: &NamingConfig) -> Self {
        Naming {
            enabled: config.enabled,
            uppercase_words: config
                .uppercase_words
                .iter()
                .map(|w| w.to_uppercase())
                .collect(),
        }
    }

    /// A converter that returns names unchanged
    pub fn disabled() -> Self {
        Naming {
            enabled: false,
            uppercase_words: HashSet::new(),
        }
    }

    /// Whether conversion is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// External key for a column name, in lower camel case
    pub fn key(&self, name: &str) -> String {
        if !self.enabled {
            return name.to_string();
        }

        let mut result = String::with_capacity(name.len());
        for (i, word) in words(name).enumerate() {
            if i == 0 {
                result.push_str(&word.to_lowercase());
            } else {
                result.push_str(&self.capitalize(word));
            }
        }
        result
    }

    /// Display title for a column name, words separated by spaces
    pub fn title(&self, name: &str) -> String {
        if !self.enabled {
            return name.to_string();
        }

        words(name)
            .map(|word| self.capitalize(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn capitalize(&self, word: &str) -> String {
        let upper = word.to_uppercase();
        if self.uppercase_words.contains(&upper) {
            return upper;
        }

        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }
}

fn words(name: &str) -> impl Iterator<Item = &str> {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key() {
        let naming = Naming::default();
        assert_eq!(naming.key("id"), "id");
        assert_eq!(naming.key("email"), "email");
        assert_eq!(naming.key("user_id"), "userID");
        assert_eq!(naming.key("first_name"), "firstName");
        assert_eq!(naming.key("CREATED_ON"), "createdOn");
    }

    #[test]
    fn test_title() {
        let naming = Naming::default();
        assert_eq!(naming.title("id"), "ID");
        assert_eq!(naming.title("email"), "Email");
        assert_eq!(naming.title("user_id"), "User ID");
        assert_eq!(naming.title("first_name"), "First Name");
    }

    #[test]
    fn test_custom_uppercase_words() {
        let naming = Naming::new(&NamingConfig {
            enabled: true,
            uppercase_words: vec!["url".to_string(), "ID".to_string()],
        });
        assert_eq!(naming.key("home_url"), "homeURL");
        assert_eq!(naming.title("home_url"), "Home URL");
    }

    #[test]
    fn test_disabled() {
        let naming = Naming::disabled();
        assert!(!naming.is_enabled());
        assert_eq!(naming.key("user_id"), "user_id");
        assert_eq!(naming.title("user_id"), "user_id");
    }
}
