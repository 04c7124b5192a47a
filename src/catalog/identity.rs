//! Closed value sets used by descriptor fields.
//!
//! Every enum-constrained field (`kind`, `profiles`, `os`, registry `type`,
//! and the optional top-level `type`) goes through [`ClosedSet::parse`], so an
//! out-of-set value always produces the same [`InvalidValue`] shape naming the
//! field, the offending value, and the allowed set.

use std::fmt;

/// A field whose values come from a fixed, closed list.
pub trait ClosedSet: Sized + Copy + 'static {
    /// Field label used in diagnostics (`invalid <FIELD>: ...`).
    const FIELD: &'static str;
    /// Every accepted spelling, in the order shown to authors.
    const VARIANTS: &'static [(&'static str, Self)];

    fn parse(raw: &str) -> Result<Self, InvalidValue> {
        Self::VARIANTS
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, value)| *value)
            .ok_or_else(|| InvalidValue {
                field: Self::FIELD,
                value: raw.to_string(),
                allowed: Self::VARIANTS.iter().map(|(name, _)| *name).collect(),
            })
    }

    fn as_str(self) -> &'static str;
}

/// A value rejected by a [`ClosedSet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidValue {
    pub field: &'static str,
    pub value: String,
    pub allowed: Vec<&'static str>,
}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {}: '{}' (valid: {})",
            self.field,
            self.value,
            self.allowed.join(", ")
        )
    }
}

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl ClosedSet for $name {
            const FIELD: &'static str = $field;
            const VARIANTS: &'static [(&'static str, Self)] = &[$(($text, $name::$variant)),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set! {
    /// What an app entry installs.
    AppKind, "kind" {
        App => "app",
        CliTool => "cli-tool",
        Runtime => "runtime",
        Dotfile => "dotfile",
    }
}

closed_set! {
    /// Audience profiles an entry is recommended for.
    Profile, "profile" {
        Developer => "developer",
        PowerUser => "power-user",
        Casual => "casual",
        Gamer => "gamer",
        Creative => "creative",
    }
}

closed_set! {
    Os, "os" {
        Windows => "windows",
        Linux => "linux",
        Macos => "macos",
    }
}

closed_set! {
    /// Windows registry value types a tweak may write.
    RegistryType, "registry type" {
        Dword => "dword",
        String => "string",
        Qword => "qword",
        ExpandString => "expandstring",
        MultiString => "multistring",
        Binary => "binary",
    }
}

closed_set! {
    /// The three descriptor families, keyed by their top-level directory.
    EntryType, "type" {
        App => "app",
        Font => "font",
        Tweak => "tweak",
    }
}

impl EntryType {
    pub const ALL: [EntryType; 3] = [EntryType::App, EntryType::Font, EntryType::Tweak];

    /// Directory under `catalog/` holding this type's descriptors; also the
    /// key of this type's list in `index.yaml`.
    pub fn dir_name(self) -> &'static str {
        match self {
            EntryType::App => "apps",
            EntryType::Font => "fonts",
            EntryType::Tweak => "tweaks",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_values() {
        assert_eq!(AppKind::parse("cli-tool"), Ok(AppKind::CliTool));
        assert_eq!(Profile::parse("power-user"), Ok(Profile::PowerUser));
        assert_eq!(RegistryType::parse("expandstring"), Ok(RegistryType::ExpandString));
        assert_eq!(EntryType::parse("tweak"), Ok(EntryType::Tweak));
    }

    #[test]
    fn invalid_value_names_value_and_allowed_set() {
        let err = AppKind::parse("widget").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid kind: 'widget' (valid: app, cli-tool, runtime, dotfile)"
        );
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!(Os::parse("Windows").is_err());
        assert_eq!(Os::Windows.as_str(), "windows");
    }

    #[test]
    fn entry_type_dirs() {
        let dirs: Vec<_> = EntryType::ALL.iter().map(|t| t.dir_name()).collect();
        assert_eq!(dirs, vec!["apps", "fonts", "tweaks"]);
    }
}
