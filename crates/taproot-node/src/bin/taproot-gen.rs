//! Erdős–Rényi edge-list generator.
//!
//! `taproot-gen <n> <p>` samples G(n, p) and writes both directed lines
//! for every kept unordered edge, sorted, to standard output - exactly
//! the input the node binary consumes.

use std::io::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use taproot_topology::erdos_renyi;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (Some(n), Some(p)) = (args.get(1), args.get(2)) else {
        bail!("usage: taproot-gen <n> <p>");
    };
    let n: usize = n.parse().context("vertex count must be an integer")?;
    let p: f64 = p.parse().context("edge probability must be a float")?;
    if !(0.0..=1.0).contains(&p) {
        bail!("edge probability {p} out of [0, 1]");
    }

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (source, dest) in erdos_renyi(n, p, &mut rng) {
        writeln!(out, "{source} {dest}")?;
    }
    Ok(())
}
