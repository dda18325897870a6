//! Self-checks for a configured library, run by `babel verify`.

use babel_core::{BigUint, Library, PageRef};
use num_bigint::RandBigInt;
use num_traits::{One, Zero};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Content number of address 0 under the reference configuration.
pub const GOLDEN_ENCRYPT_ZERO: &str = "211653502807301050253822313329907129689528942948102436513313867637306358822167284761883231522110614438142070414055181";

/// First line of hex 0, wall 0, shelf 0, volume 0, page 0.
pub const GOLDEN_FIRST_LINE: &str =
    "dehxvpp,az.,rcyvrxtgzkyvbiczzkobzrzimyykpezxdrljnxrbklxweofpzbhvm,f,yuatgkgak.li";

/// Check identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    /// decrypt(encrypt(a)) == a on edge values and random samples
    CipherRoundtrip,

    /// Distinct addresses give distinct contents
    Collisions,

    /// Digit shuffle and unshuffle undo each other
    Shuffle,

    /// Coordinates and addresses convert both ways
    Coordinates,

    /// Searched text appears at the returned coordinates
    Search,

    /// Known outputs of the reference configuration
    Golden,
}

impl CheckId {
    /// Returns a list of all checks.
    pub fn all() -> Vec<CheckId> {
        vec![
            CheckId::CipherRoundtrip,
            CheckId::Collisions,
            CheckId::Shuffle,
            CheckId::Coordinates,
            CheckId::Search,
            CheckId::Golden,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CheckId::CipherRoundtrip => "cipher_roundtrip",
            CheckId::Collisions => "collisions",
            CheckId::Shuffle => "shuffle",
            CheckId::Coordinates => "coordinates",
            CheckId::Search => "search",
            CheckId::Golden => "golden",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CheckId::CipherRoundtrip => "decrypt inverts encrypt on 0, 1, N-1, 29^40 and random addresses",
            CheckId::Collisions => "no two sampled addresses share a content number",
            CheckId::Shuffle => "unshuffle(shuffle(n)) == n and shuffle(unshuffle(n)) == n",
            CheckId::Coordinates => "coordinates -> address -> coordinates and back",
            CheckId::Search => "search(text) lands on a line reading normalize(text)",
            CheckId::Golden => "reference outputs for address 0, page 0 and \"hello world\"",
        }
    }
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CheckId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cipher_roundtrip" | "roundtrip" | "cipher" => Ok(CheckId::CipherRoundtrip),
            "collisions" | "collision" => Ok(CheckId::Collisions),
            "shuffle" | "permutation" => Ok(CheckId::Shuffle),
            "coordinates" | "coords" => Ok(CheckId::Coordinates),
            "search" => Ok(CheckId::Search),
            "golden" => Ok(CheckId::Golden),
            _ => Err(format!("Unknown check: {}", s)),
        }
    }
}

/// Result of running one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Check that was run
    pub check: CheckId,

    /// Seed used
    pub seed: u64,

    /// Whether every sample passed
    pub passed: bool,

    /// Random samples drawn
    pub samples: usize,

    /// Wall-clock duration in milliseconds
    pub elapsed_ms: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// Runs self-checks against a library.
pub struct CheckRunner {
    seed: u64,
    samples: usize,
}

impl CheckRunner {
    pub fn new(seed: u64) -> Self {
        Self { seed, samples: 100 }
    }

    /// Sets the number of random samples per check.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Runs a check and returns the result.
    pub fn run(&self, library: &Library, check: CheckId) -> CheckResult {
        info!("Running check: {} (seed={})", check.name(), self.seed);

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let start = Instant::now();
        let outcome = match check {
            CheckId::CipherRoundtrip => self.cipher_roundtrip(library, &mut rng),
            CheckId::Collisions => self.collisions(library, &mut rng),
            CheckId::Shuffle => self.shuffle(library, &mut rng),
            CheckId::Coordinates => self.coordinates(library, &mut rng),
            CheckId::Search => self.search(library, &mut rng),
            CheckId::Golden => golden(library),
        };
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!("  {} finished in {:.1}ms", check.name(), elapsed_ms);

        CheckResult {
            check,
            seed: self.seed,
            passed: outcome.is_ok(),
            samples: self.samples,
            elapsed_ms,
            failure_reason: outcome.err(),
        }
    }

    fn cipher_roundtrip(&self, library: &Library, rng: &mut ChaCha8Rng) -> Result<(), String> {
        let n = library.modulus();
        let half = BigUint::from(library.symbols().base()).pow(library.line_length() as u32 / 2);
        let edges = [BigUint::zero(), BigUint::one(), n - 1u32, half];

        let sampled = (0..self.samples).map(|_| rng.gen_biguint_below(n));
        for address in edges.into_iter().chain(sampled) {
            let content = library.encrypt(&address);
            if &content >= n {
                return Err(format!("encrypt({}) left the address space", address));
            }
            if library.decrypt(&content) != address {
                return Err(format!("decrypt(encrypt({})) differs from the input", address));
            }
        }
        Ok(())
    }

    fn collisions(&self, library: &Library, rng: &mut ChaCha8Rng) -> Result<(), String> {
        let n = library.modulus();
        let mut addresses: HashSet<BigUint> = (0..self.samples as u64).map(BigUint::from).collect();
        addresses.extend((0..self.samples).map(|_| rng.gen_biguint_below(n)));

        let mut seen = HashSet::with_capacity(addresses.len());
        for address in &addresses {
            if !seen.insert(library.encrypt(address)) {
                return Err(format!("address {} collides with an earlier address", address));
            }
        }
        Ok(())
    }

    fn shuffle(&self, library: &Library, rng: &mut ChaCha8Rng) -> Result<(), String> {
        let perm = library.cipher().permutation();
        for _ in 0..self.samples {
            let n = rng.gen_biguint_below(library.modulus());
            if perm.unshuffle(&perm.shuffle(&n)) != n || perm.shuffle(&perm.unshuffle(&n)) != n {
                return Err(format!("permutation does not invert on {}", n));
            }
        }
        Ok(())
    }

    fn coordinates(&self, library: &Library, rng: &mut ChaCha8Rng) -> Result<(), String> {
        let layout = *library.layout();
        for _ in 0..self.samples {
            let coords = PageRef::new(
                library.random_hex(rng),
                rng.gen_range(0..layout.walls),
                rng.gen_range(0..layout.shelves),
                rng.gen_range(0..layout.volumes),
                rng.gen_range(0..layout.pages),
            )
            .line(rng.gen_range(0..layout.lines));

            let address = library.coords_to_address(&coords).map_err(|e| e.to_string())?;
            if library.address_to_coords(&address) != coords {
                return Err(format!("coordinates {:?} do not round-trip", coords));
            }

            let address = rng.gen_biguint_below(library.modulus());
            let back = library
                .coords_to_address(&library.address_to_coords(&address))
                .map_err(|e| e.to_string())?;
            if back != address {
                return Err(format!("address {} does not round-trip", address));
            }
        }
        Ok(())
    }

    fn search(&self, library: &Library, rng: &mut ChaCha8Rng) -> Result<(), String> {
        let alphabet: Vec<char> = library.symbols().alphabet().to_vec();
        for _ in 0..self.samples {
            let len = rng.gen_range(0..=library.line_length());
            let text: String = (0..len).map(|_| alphabet[rng.gen_range(0..alphabet.len())]).collect();

            let found = library.search(&text);
            let line = library.line(&found).map_err(|e| e.to_string())?;
            if line != library.normalize(&text) {
                return Err(format!("search({:?}) landed on {:?}", text, line));
            }
        }
        Ok(())
    }
}

fn golden(library: &Library) -> Result<(), String> {
    let content = library.encrypt(&BigUint::zero());
    if content.to_string() != GOLDEN_ENCRYPT_ZERO {
        return Err("encrypt(0) differs from the reference value".to_string());
    }

    let first = library
        .line(&PageRef::new(0u64, 0, 0, 0, 0).line(0))
        .map_err(|e| e.to_string())?;
    if first != GOLDEN_FIRST_LINE {
        return Err(format!("first line of hex 0 is {:?}", first));
    }

    let found = library.search("hello world");
    let fields = (found.wall, found.shelf, found.volume, found.page, found.line);
    if fields != (0, 3, 25, 249, 5) {
        return Err(format!("\"hello world\" found at {:?}", fields));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use babel_core::LibraryConfig;

    fn library() -> Library {
        Library::reference().unwrap()
    }

    #[test]
    fn test_check_names_parse() {
        for check in CheckId::all() {
            assert_eq!(check.name().parse::<CheckId>().unwrap(), check);
            assert_eq!(check.to_string(), check.name());
        }
        assert!("nonsense".parse::<CheckId>().is_err());
    }

    #[test]
    fn test_all_checks_pass_on_reference() {
        let lib = library();
        let runner = CheckRunner::new(42).with_samples(20);
        for check in CheckId::all() {
            let result = runner.run(&lib, check);
            assert!(result.passed, "{}: {:?}", check, result.failure_reason);
            assert_eq!(result.seed, 42);
        }
    }

    #[test]
    fn test_golden_fails_on_other_keys() {
        let mut config = LibraryConfig::reference();
        config.rounds[0].increment = "1".to_string();
        let lib = Library::new(&config).unwrap();

        let result = CheckRunner::new(1).run(&lib, CheckId::Golden);
        assert!(!result.passed);
        assert!(result.failure_reason.unwrap().contains("encrypt(0)"));

        // The bijection itself still holds.
        assert!(CheckRunner::new(1).with_samples(10).run(&lib, CheckId::CipherRoundtrip).passed);
    }

    #[test]
    fn test_result_serializes() {
        let result = CheckRunner::new(7).with_samples(1).run(&library(), CheckId::Shuffle);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["check"], "shuffle");
        assert_eq!(json["passed"], true);
        assert!(json["failure_reason"].is_null());
    }
}
