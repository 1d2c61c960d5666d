//! Computes a leakage-probability bound for the single-wire-copy fixture via the RP driver and
//! the coefficient accumulator (§4.9), the way an embedding CLI's `rp` subcommand would.

use gadget_verify::coeff::{compute_leakage_proba, TailBound};
use gadget_verify::config::EngineConfig;
use gadget_verify::fixtures;
use gadget_verify::properties::rp;
use num_bigint::BigInt;
use num_rational::BigRational;

fn main() {
    env_logger::init();
    let (circuit, _) = fixtures::single_wire_copy();
    let config = EngineConfig::single_threaded();

    let result = rp::verify(&circuit, &config).expect("fixture circuit is well-formed");
    println!(
        "single_wire_copy: coeffs = {:?} (known up to tuple size {})",
        result.coeffs, result.known_up_to
    );

    let p = BigRational::new(BigInt::from(1), BigInt::from(100));
    let bound = compute_leakage_proba(&result.coeffs, result.total_wires, result.known_up_to, &p, TailBound::Upper);
    println!("leakage probability at p=1/100: {bound}");
}
