use crate::db::StorageError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
            type Err = StorageError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StorageError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(TemperatureRisk {
    Low => "low",
    High => "high",
    Critical => "critical",
});

str_enum!(TempStatus {
    Safe => "safe",
    Unsafe => "unsafe",
});

str_enum!(StockStatus {
    Available => "available",
    Reserved => "reserved",
});

str_enum!(StoreStatus {
    Pending => "pending",
    Verified => "verified",
});

str_enum!(RiskLevel {
    Safe => "safe",
    Warning => "warning",
    Critical => "critical",
});

str_enum!(DemandLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(Role {
    User => "user",
    Store => "store",
    Admin => "admin",
});

str_enum!(RequestStatus {
    Open => "open",
    Fulfilled => "fulfilled",
});

/// Store uploads report a two-state sensor verdict; the scoring table
/// treats Unsafe like a High exposure, never Critical.
impl From<TempStatus> for TemperatureRisk {
    fn from(status: TempStatus) -> Self {
        match status {
            TempStatus::Safe => TemperatureRisk::Low,
            TempStatus::Unsafe => TemperatureRisk::High,
        }
    }
}
