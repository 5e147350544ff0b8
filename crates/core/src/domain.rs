use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of interview domains served by the question repository.
///
/// Selection input is validated against this set; anything outside it is
/// rejected at the boundary and never reaches the question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Marketing,
    Finance,
    #[serde(rename = "Operations & General Management")]
    OperationsAndGeneralManagement,
    Consulting,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Marketing,
        Domain::Finance,
        Domain::OperationsAndGeneralManagement,
        Domain::Consulting,
    ];

    /// Human-facing label, as shown in the domain selector.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Marketing => "Marketing",
            Domain::Finance => "Finance",
            Domain::OperationsAndGeneralManagement => "Operations & General Management",
            Domain::Consulting => "Consulting",
        }
    }

    /// Labels of every domain, in selector order.
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|d| d.label().to_string()).collect()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "marketing" => Ok(Domain::Marketing),
            "finance" => Ok(Domain::Finance),
            "operations & general management"
            | "operations and general management"
            | "operations" => Ok(Domain::OperationsAndGeneralManagement),
            "consulting" => Ok(Domain::Consulting),
            _ => Err(format!("'{s}' is not a recognised interview domain")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_label() {
        for domain in Domain::ALL {
            assert_eq!(domain.label().parse::<Domain>().unwrap(), domain);
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!("  FINANCE ".parse::<Domain>().unwrap(), Domain::Finance);
        assert_eq!(
            "operations and general management".parse::<Domain>().unwrap(),
            Domain::OperationsAndGeneralManagement
        );
    }

    #[test]
    fn rejects_unknown_domain() {
        assert!("Engineering".parse::<Domain>().is_err());
        assert!("".parse::<Domain>().is_err());
    }

    #[test]
    fn labels_follow_selector_order() {
        assert_eq!(
            Domain::labels(),
            vec![
                "Marketing",
                "Finance",
                "Operations & General Management",
                "Consulting"
            ]
        );
    }
}
