//! Named views of a formatted record.

use std::fmt;
use std::str::FromStr;

use crate::KontragentError;

/// A section of a record's presentation, selected by the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Page {
    /// Short summary shown first.
    #[default]
    Card,
    Details,
    Contacts,
    Finance,
    Founders,
    Management,
    Taxes,
    Litigation,
    Documents,
    Successor,
    /// Plain-text requisites for copying.
    Export,
    /// `key=value` lines for CRM import.
    Crm,
    /// Every leaf field of the record.
    RawDump,
}

impl Page {
    pub const ALL: [Page; 13] = [
        Page::Card,
        Page::Details,
        Page::Contacts,
        Page::Finance,
        Page::Founders,
        Page::Management,
        Page::Taxes,
        Page::Litigation,
        Page::Documents,
        Page::Successor,
        Page::Export,
        Page::Crm,
        Page::RawDump,
    ];

    /// Stable id, safe to embed in callback data.
    pub fn id(&self) -> &'static str {
        match self {
            Page::Card => "card",
            Page::Details => "details",
            Page::Contacts => "contacts",
            Page::Finance => "finance",
            Page::Founders => "founders",
            Page::Management => "management",
            Page::Taxes => "taxes",
            Page::Litigation => "litigation",
            Page::Documents => "documents",
            Page::Successor => "successor",
            Page::Export => "export",
            Page::Crm => "crm",
            Page::RawDump => "raw",
        }
    }

    /// Human-readable title: the heading of section pages and the
    /// navigation label.
    pub fn title(&self) -> &'static str {
        match self {
            Page::Card => "Card",
            Page::Details => "Details",
            Page::Contacts => "Contacts",
            Page::Finance => "Finance",
            Page::Founders => "Founders",
            Page::Management => "Management",
            Page::Taxes => "Taxes",
            Page::Litigation => "Litigation and enforcement",
            Page::Documents => "Licenses and documents",
            Page::Successor => "Legal succession",
            Page::Export => "Requisites",
            Page::Crm => "CRM export",
            Page::RawDump => "All registry fields",
        }
    }
}

impl FromStr for Page {
    type Err = KontragentError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let id = s.trim().to_ascii_lowercase();
        Page::ALL
            .into_iter()
            .find(|page| page.id() == id)
            .ok_or_else(|| KontragentError::InvalidInput(format!("unknown page: {id:?}")))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for page in Page::ALL {
            assert!(seen.insert(page.id()));
            assert_eq!(page.id().parse::<Page>().unwrap(), page);
        }
    }

    #[test]
    fn unknown_page_is_rejected() {
        assert!("balance".parse::<Page>().is_err());
    }
}
