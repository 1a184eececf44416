use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(DosageForm {
    Tablet => "tablet",
    Capsule => "capsule",
    Injection => "injection",
    Syrup => "syrup",
    Drops => "drops",
});

str_enum!(Frequency {
    OnceDaily => "once_daily",
    TwiceDaily => "twice_daily",
    ThriceDaily => "thrice_daily",
    EveryNightAtBedtime => "every_night_at_bedtime",
});

/// Fixed reminder clock times per frequency bucket, as (hour, minute).
const ONCE_DAILY_TIMES: &[(u32, u32)] = &[(8, 0)];
const TWICE_DAILY_TIMES: &[(u32, u32)] = &[(8, 0), (20, 0)];
const THRICE_DAILY_TIMES: &[(u32, u32)] = &[(8, 0), (14, 0), (20, 0)];
const BEDTIME_TIMES: &[(u32, u32)] = &[(22, 0)];

impl Frequency {
    /// Reminder times for this bucket. Always non-empty, ascending, no duplicates.
    pub fn reminder_times(&self) -> Vec<NaiveTime> {
        let table = match self {
            Self::OnceDaily => ONCE_DAILY_TIMES,
            Self::TwiceDaily => TWICE_DAILY_TIMES,
            Self::ThriceDaily => THRICE_DAILY_TIMES,
            Self::EveryNightAtBedtime => BEDTIME_TIMES,
        };
        table
            .iter()
            .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .collect()
    }
}

str_enum!(VitalKind {
    RandomBloodSugar => "blood_sugar_random",
    HbA1c => "hba1c",
    SystolicBP => "bp_sys",
    DiastolicBP => "bp_dia",
    HeartRate => "heart_rate",
    SpO2 => "spo2",
});

impl VitalKind {
    pub const ALL: [VitalKind; 6] = [
        VitalKind::RandomBloodSugar,
        VitalKind::HbA1c,
        VitalKind::SystolicBP,
        VitalKind::DiastolicBP,
        VitalKind::HeartRate,
        VitalKind::SpO2,
    ];

    /// Upper bound of a physically plausible reading, used to reject typos at entry.
    pub fn plausible_max(&self) -> f64 {
        match self {
            Self::RandomBloodSugar => 1500.0,
            Self::HbA1c => 25.0,
            Self::SystolicBP => 300.0,
            Self::DiastolicBP => 200.0,
            Self::HeartRate => 300.0,
            Self::SpO2 => 100.0,
        }
    }

    /// Finite, non-negative and within the plausible range. Zero is accepted.
    pub fn is_plausible(&self, value: f64) -> bool {
        value.is_finite() && (0.0..=self.plausible_max()).contains(&value)
    }
}

str_enum!(DoseStatus {
    Reminder => "reminder",
    Taken => "taken",
    Missed => "missed",
});

str_enum!(Severity {
    Normal => "normal",
    Warning => "warning",
});
