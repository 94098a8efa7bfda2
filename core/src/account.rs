//! Account generator — maps the customer population to bank accounts.
//!
//! Every customer gets a checking account; savings/business/investment
//! accounts are probabilistic extras. The transaction generator selects
//! among a customer's accounts with type-based weights.

use crate::{config::GeneratorConfig, customer::Customer, rng::StreamRng, types::AccountId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub customer_id: String,
    pub account_type: String,
    pub base_currency: String,
    pub status: String,
    /// YYYY-MM-DD, the owning customer's onboarding date.
    pub open_date: String,
}

pub struct AccountGenerator;

impl AccountGenerator {
    pub fn generate(
        _config: &GeneratorConfig,
        customers: &[Customer],
        rng: &mut StreamRng,
    ) -> Vec<Account> {
        let mut accounts = Vec::new();

        for customer in customers {
            let mut types: Vec<&str> = vec!["CHECKING"];
            if rng.chance(0.45) {
                types.push("SAVINGS");
            }
            if rng.chance(0.12) {
                types.push("BUSINESS");
            }
            if rng.chance(0.08) {
                types.push("INVESTMENT");
            }

            for (n, account_type) in types.iter().enumerate() {
                accounts.push(Account {
                    account_id: format!("{}_{}_{:02}", customer.customer_id, account_type, n + 1),
                    customer_id: customer.customer_id.clone(),
                    account_type: account_type.to_string(),
                    base_currency: customer.reporting_currency.clone(),
                    status: "ACTIVE".into(),
                    open_date: customer.onboarding_date.clone(),
                });
            }
        }

        log::info!(
            "generated {} accounts for {} customers",
            accounts.len(),
            customers.len()
        );
        accounts
    }

    /// Group accounts by owning customer for fast lookup during
    /// transaction generation.
    pub fn by_customer(accounts: &[Account]) -> HashMap<String, Vec<Account>> {
        let mut map: HashMap<String, Vec<Account>> = HashMap::new();
        for account in accounts {
            map.entry(account.customer_id.clone())
                .or_default()
                .push(account.clone());
        }
        map
    }

    /// Weighted account selection: checking accounts see most of the
    /// traffic, investment accounts the least.
    pub fn select_for_transaction<'a>(
        accounts: &'a [Account],
        rng: &mut StreamRng,
    ) -> Option<&'a Account> {
        if accounts.is_empty() {
            return None;
        }
        let weights: Vec<f64> = accounts
            .iter()
            .map(|a| match a.account_type.as_str() {
                "CHECKING" => 0.60,
                "SAVINGS" => 0.20,
                "BUSINESS" => 0.15,
                "INVESTMENT" => 0.05,
                _ => 0.10,
            })
            .collect();
        Some(&accounts[rng.pick_weighted(&weights)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::CustomerGenerator;
    use crate::rng::{GeneratorSlot, RngBank};

    #[test]
    fn every_customer_has_a_checking_account() {
        let config = GeneratorConfig::default_test();
        let bank = RngBank::new(42);
        let mut crng = bank.for_generator(GeneratorSlot::Customer);
        let (customers, _) = CustomerGenerator::generate(&config, &mut crng);

        let mut arng = bank.for_generator(GeneratorSlot::Account);
        let accounts = AccountGenerator::generate(&config, &customers, &mut arng);

        let grouped = AccountGenerator::by_customer(&accounts);
        for customer in &customers {
            let owned = grouped
                .get(&customer.customer_id)
                .expect("customer has accounts");
            assert!(owned.iter().any(|a| a.account_type == "CHECKING"));
            assert!(owned.iter().all(|a| a.base_currency == customer.reporting_currency));
        }
    }

    #[test]
    fn selection_prefers_checking() {
        let bank = RngBank::new(1);
        let mut rng = bank.for_generator(GeneratorSlot::Transaction);
        let accounts = vec![
            Account {
                account_id: "C1_CHECKING_01".into(),
                customer_id: "C1".into(),
                account_type: "CHECKING".into(),
                base_currency: "EUR".into(),
                status: "ACTIVE".into(),
                open_date: "2024-01-01".into(),
            },
            Account {
                account_id: "C1_INVESTMENT_02".into(),
                customer_id: "C1".into(),
                account_type: "INVESTMENT".into(),
                base_currency: "EUR".into(),
                status: "ACTIVE".into(),
                open_date: "2024-01-01".into(),
            },
        ];
        let checking_hits = (0..1000)
            .filter(|_| {
                AccountGenerator::select_for_transaction(&accounts, &mut rng)
                    .unwrap()
                    .account_type
                    == "CHECKING"
            })
            .count();
        assert!(checking_hits > 800, "checking picked {checking_hits}/1000");
    }
}
