use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(ConversationType {
    Flow => "flow",
    Task => "task",
    Orb => "orb",
});

str_enum!(CheckType {
    Passive => "passive",
    White => "white",
    Red => "red",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn conversation_type_round_trip() {
        for (variant, s) in [
            (ConversationType::Flow, "flow"),
            (ConversationType::Task, "task"),
            (ConversationType::Orb, "orb"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ConversationType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn check_type_round_trip() {
        for (variant, s) in [
            (CheckType::Passive, "passive"),
            (CheckType::White, "white"),
            (CheckType::Red, "red"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(CheckType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(ConversationType::from_str("Task").is_err());
        assert!(CheckType::from_str("").is_err());
    }
}
