//! Named ERP environments

use serde::{Deserialize, Serialize};

/// Fixed set of ERP environments a deployment can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    Dev,
}

impl Environment {
    /// All environments, in selection-priority order.
    pub const ALL: [Environment; 2] = [Environment::Prod, Environment::Dev];
}

crate::impl_domain_label_conversions!(Environment {
    Prod => "prod",
    Dev => "dev",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_values() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Dev);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_labels() {
        assert_eq!(serde_json::to_value(Environment::Dev).unwrap(), serde_json::json!("dev"));
        let env: Environment = serde_json::from_str("\"prod\"").unwrap();
        assert_eq!(env, Environment::Prod);
    }
}
