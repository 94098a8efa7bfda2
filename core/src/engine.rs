//! Generation pipeline.
//!
//! Subsystems run in a fixed order, each drawing from its own named
//! random stream, so adding draws to one subsystem never shifts the
//! output of another. The pipeline is pure up to `write_all`: a run
//! produces an in-memory bundle first, then persists it in one pass.

use crate::{
    account::{Account, AccountGenerator},
    anomaly::{AnomalyEngine, AnomalyProfile},
    config::GeneratorConfig,
    customer::{Customer, CustomerAddress, CustomerGenerator},
    error::GenResult,
    lifecycle::{CustomerStatus, LifecycleEngine, LifecycleEvent},
    rng::{GeneratorSlot, RngBank},
    store::DataStore,
    transaction::{Transaction, TransactionGenerator},
    update_feed::{
        AddressBatch, AddressRecord, AddressUpdateGenerator, CustomerSnapshot,
        CustomerUpdateBatch, CustomerUpdateGenerator,
    },
};
use std::collections::HashMap;

/// Everything one run produces, before persistence.
pub struct GeneratedData {
    pub customers: Vec<Customer>,
    pub initial_addresses: Vec<CustomerAddress>,
    pub accounts: Vec<Account>,
    pub address_batches: Vec<AddressBatch>,
    pub update_batches: Vec<CustomerUpdateBatch>,
    pub profiles: HashMap<String, AnomalyProfile>,
    pub transactions: Vec<Transaction>,
    pub events: Vec<LifecycleEvent>,
    pub statuses: Vec<CustomerStatus>,
}

pub struct GenerationEngine {
    config: GeneratorConfig,
    rng_bank: RngBank,
}

impl GenerationEngine {
    pub fn new(config: GeneratorConfig, master_seed: u64) -> Self {
        Self {
            config,
            rng_bank: RngBank::new(master_seed),
        }
    }

    pub fn run(&self) -> GenResult<GeneratedData> {
        log::info!(
            "generating {} customers over {} months",
            self.config.num_customers,
            self.config.generation_period_months
        );

        let mut customer_rng = self.rng_bank.for_generator(GeneratorSlot::Customer);
        let (customers, initial_addresses) =
            CustomerGenerator::generate(&self.config, &mut customer_rng);

        let mut account_rng = self.rng_bank.for_generator(GeneratorSlot::Account);
        let accounts = AccountGenerator::generate(&self.config, &customers, &mut account_rng);
        let accounts_by_customer = AccountGenerator::by_customer(&accounts);

        let mut address_rng = self.rng_bank.for_generator(GeneratorSlot::AddressUpdate);
        let address_batches =
            AddressUpdateGenerator::generate(&self.config, &customers, &mut address_rng);

        let mut update_rng = self.rng_bank.for_generator(GeneratorSlot::CustomerUpdate);
        let update_batches =
            CustomerUpdateGenerator::generate(&self.config, &customers, &mut update_rng);

        let mut anomaly_rng = self.rng_bank.for_generator(GeneratorSlot::Anomaly);
        let anomaly_engine = AnomalyEngine::new(self.config.clone());
        let profiles: HashMap<String, AnomalyProfile> = customers
            .iter()
            .filter(|c| c.has_anomaly)
            .map(|c| {
                (
                    c.customer_id.clone(),
                    anomaly_engine.generate_profile(&c.customer_id, &mut anomaly_rng),
                )
            })
            .collect();
        log::info!("generated {} anomaly profiles", profiles.len());

        let mut txn_rng = self.rng_bank.for_generator(GeneratorSlot::Transaction);
        let transactions = TransactionGenerator::new(self.config.clone()).generate(
            &customers,
            &accounts_by_customer,
            &profiles,
            &mut txn_rng,
        );

        let address_feed: Vec<AddressRecord> = initial_addresses
            .iter()
            .map(AddressRecord::from)
            .chain(
                address_batches
                    .iter()
                    .flat_map(|b| b.records.iter().cloned()),
            )
            .collect();
        let update_feed: Vec<CustomerSnapshot> = update_batches
            .iter()
            .flat_map(|b| b.records.iter().cloned())
            .collect();

        let mut lifecycle_rng = self.rng_bank.for_generator(GeneratorSlot::Lifecycle);
        let (events, statuses) = LifecycleEngine::new(self.config.clone()).generate(
            &customers,
            &address_feed,
            &update_feed,
            &mut lifecycle_rng,
        )?;

        Ok(GeneratedData {
            customers,
            initial_addresses,
            accounts,
            address_batches,
            update_batches,
            profiles,
            transactions,
            events,
            statuses,
        })
    }

    pub fn write_all(&self, data: &GeneratedData) -> GenResult<()> {
        let store = DataStore::new(&self.config.output_directory);
        store.write_customers(&data.customers)?;
        store.write_initial_addresses(&data.initial_addresses)?;
        store.write_accounts(&data.accounts)?;
        store.write_address_batches(&data.address_batches)?;
        store.write_update_batches(&data.update_batches)?;
        store.write_transactions(&data.transactions)?;
        store.write_events(&data.events)?;
        store.write_status_history(&data.statuses)?;
        log::info!("wrote all datasets to {}", store.root().display());
        Ok(())
    }
}

/// Rebuild lifecycle outputs from previously written feed files. This
/// is the replay path: it reads back exactly what a prior run wrote and
/// must reproduce the same events and statuses.
pub fn replay_lifecycle(
    config: &GeneratorConfig,
    master_seed: u64,
) -> GenResult<(Vec<LifecycleEvent>, Vec<CustomerStatus>)> {
    let store = DataStore::new(&config.output_directory);
    let customers = store.read_customers()?;
    let address_feed = store.read_address_feed()?;
    let update_feed = store.read_update_feed()?;

    let mut lifecycle_rng = RngBank::new(master_seed).for_generator(GeneratorSlot::Lifecycle);
    LifecycleEngine::new(config.clone()).generate(
        &customers,
        &address_feed,
        &update_feed,
        &mut lifecycle_rng,
    )
}
