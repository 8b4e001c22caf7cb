//! German/English texts emitted by the map and lead-form flows.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PulseError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    De,
    En,
}

impl Lang {
    pub const fn code(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
        }
    }

    pub fn strings(self) -> &'static Strings {
        match self {
            Self::De => &DE,
            Self::En => &EN,
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" => Ok(Self::De),
            "en" => Ok(Self::En),
            other => Err(PulseError::Config(format!("Unsupported language: {other:?}"))),
        }
    }
}

/// Texts for one language. Status lines with parameters are methods.
#[derive(Debug)]
pub struct Strings {
    status_all_prefix: &'static str,
    status_nearest: (&'static str, &'static str),
    pub status_not_found: &'static str,
    pub searching: &'static str,
    pub form_alert: &'static str,
    pub mail_fallback_notice: &'static str,
    pub modal_body: &'static str,
    pub mail_subject: &'static str,
    pub cta_prefill: &'static str,
}

impl Strings {
    pub fn status_all(&self, n: usize) -> String {
        format!("{}{n}", self.status_all_prefix)
    }

    pub fn status_nearest(&self, k: usize, query: &str) -> String {
        let (before, after) = self.status_nearest;
        format!("{before}{k}{after}{query}")
    }
}

static DE: Strings = Strings {
    status_all_prefix: "Alle Punkte: ",
    status_nearest: ("Zeige ", " nächste Praxen zu: "),
    status_not_found: "Adresse nicht gefunden. Bitte präziser versuchen.",
    searching: "…",
    form_alert: "Danke! Wir melden uns per E‑Mail.",
    mail_fallback_notice: "Kein direkter Server erreichbar — es öffnet sich Ihr E‑Mail-Client.",
    modal_body: "Wir melden uns in Kürze per E‑Mail mit einem Beispielreport.",
    mail_subject: "Sample report request — DentalMarketPulse",
    cta_prefill: "Ich hätte gern einen Beispielreport für meine Praxis.",
};

static EN: Strings = Strings {
    status_all_prefix: "All points: ",
    status_nearest: ("Showing ", " nearest clinics to: "),
    status_not_found: "We couldn't find that address. Try a more specific query.",
    searching: "…",
    form_alert: "Thanks! We'll get back to you via email.",
    mail_fallback_notice: "No direct server reachable — your mail client will open.",
    modal_body: "We'll be in touch shortly by email with a sample report.",
    mail_subject: "Sample report request — DentalMarketPulse",
    cta_prefill: "I’d like a sample competitor report for my clinic.",
};
