//! Calls a handful of property-driver entry points directly against the hand-built fixtures
//! (§6, "CLI surface (collaborator)"): an illustration of how an embedding CLI would wire up the
//! engine, not a general-purpose command-line tool.

use gadget_verify::config::EngineConfig;
use gadget_verify::fixtures;
use gadget_verify::properties::{ni, pini, sni};

fn report(name: &str, outcome: gadget_verify::error::Result<gadget_verify::error::VerificationOutcome>) {
    match outcome {
        Ok(outcome) if outcome.is_secure() => println!("{name}: secure"),
        Ok(gadget_verify::error::VerificationOutcome::Leaky { witness, leaked_inputs }) => {
            println!("{name}: LEAKY via probe {witness:?}, leaking input(s) {leaked_inputs:?}");
        }
        Err(err) => println!("{name}: error: {err}"),
        Ok(_) => unreachable!(),
    }
}

fn main() {
    env_logger::init();
    let config = EngineConfig::parallel();

    let (linear_refresh, _) = fixtures::linear_refresh();
    report("linear_refresh 1-NI", ni::verify(&linear_refresh, 1, &config));
    report("linear_refresh 1-SNI", sni::verify(&linear_refresh, 1, &config));

    let (identity, _) = fixtures::identity_gadget();
    report("identity_gadget 1-SNI", sni::verify(&identity, 1, &config));

    let (isw_mult, _) = fixtures::isw_mult_n2();
    report("isw_mult_n2 1-NI", ni::verify(&isw_mult, 1, &config));
    report("isw_mult_n2 2-PINI", pini::verify(&isw_mult, 2, &config));
}
