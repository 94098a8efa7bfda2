//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through StreamRng instances derived
//! from the single master seed passed to the pipeline.
//!
//! Each generator gets its own RNG stream, seeded deterministically
//! from (master_seed XOR generator_index). This means:
//!   - Adding a new generator never changes existing generators' streams.
//!   - Each generator's stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single generator.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream RNG from the master seed and a stable
    /// generator index. The index must never change once assigned.
    pub fn new(master_seed: u64, generator_index: u64) -> Self {
        let derived_seed = master_seed ^ (generator_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi] inclusive.
    pub fn int_in(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "int_in: lo must be <= hi");
        lo + self.next_u64_below((hi - lo + 1) as u64) as i64
    }

    /// Roll a float uniformly in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a Gaussian via Box-Muller.
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Sample from a log-normal distribution with the given underlying
    /// normal parameters.
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        self.gauss(mu, sigma).exp()
    }

    /// Sample from a Poisson distribution (Knuth's method).
    /// Fine for the small lambdas the transaction generator uses.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        let l = (-lambda).exp();
        let mut k = 0u64;
        let mut p = 1.0;
        loop {
            p *= self.next_f64();
            if p <= l {
                return k;
            }
            k += 1;
        }
    }

    /// Pick one element from a non-empty slice, uniformly.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "pick called on empty slice");
        &items[self.next_u64_below(items.len() as u64) as usize]
    }

    /// Pick one index from parallel weight list (weights need not sum to 1).
    pub fn pick_weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        assert!(total > 0.0, "pick_weighted: weights must be positive");
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            roll -= w;
            if roll < 0.0 {
                return i;
            }
        }
        weights.len() - 1
    }

    /// Sample k distinct indices from [0, n) without replacement
    /// (partial Fisher-Yates).
    pub fn sample_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
        assert!(k <= n, "sample_indices: k must be <= n");
        let mut pool: Vec<usize> = (0..n).collect();
        for i in 0..k {
            let j = i + self.next_u64_below((n - i) as u64) as usize;
            pool.swap(i, j);
        }
        pool.truncate(k);
        pool
    }
}

/// All generator RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_generator(&self, slot: GeneratorSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable generator slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every generator's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum GeneratorSlot {
    Customer = 0,
    Account = 1,
    AddressUpdate = 2,
    CustomerUpdate = 3,
    Anomaly = 4,
    Transaction = 5,
    Lifecycle = 6,
    // Add new generators here — append only.
}

impl GeneratorSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Account => "account",
            Self::AddressUpdate => "address_update",
            Self::CustomerUpdate => "customer_update",
            Self::Anomaly => "anomaly",
            Self::Transaction => "transaction",
            Self::Lifecycle => "lifecycle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = StreamRng::new(42, 3);
        let mut b = StreamRng::new(42, 3);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn slots_produce_distinct_streams() {
        let bank = RngBank::new(42);
        let mut a = bank.for_generator(GeneratorSlot::Customer);
        let mut b = bank.for_generator(GeneratorSlot::Anomaly);
        let same = (0..32).all(|_| a.next_u64() == b.next_u64());
        assert!(!same, "distinct slots must not share a stream");
    }

    #[test]
    fn int_in_respects_bounds() {
        let mut rng = StreamRng::new(7, 0);
        for _ in 0..1000 {
            let v = rng.int_in(1, 90);
            assert!((1..=90).contains(&v));
        }
    }

    #[test]
    fn sample_indices_are_distinct() {
        let mut rng = StreamRng::new(9, 0);
        let mut got = rng.sample_indices(7, 3);
        got.sort_unstable();
        got.dedup();
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn poisson_mean_roughly_matches_lambda() {
        let mut rng = StreamRng::new(11, 0);
        let n = 20_000;
        let total: u64 = (0..n).map(|_| rng.poisson(0.16)).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 0.16).abs() < 0.02, "poisson mean drifted: {mean}");
    }
}
