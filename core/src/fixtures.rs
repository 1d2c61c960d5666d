//! Hand-built canonical gadgets used by the test suite and by `core/examples/*.rs` (§3.1,
//! §8 "concrete scenarios"). This is test tooling standing in for the textual gadget parser,
//! not a general parser: it only knows how to build the handful of circuits the spec's
//! concrete scenarios name.

use crate::circuit::{Circuit, CircuitSource, Dependency, MultSource};

/// A gadget description built directly from dense [`Dependency`] vectors, generic enough to
/// express every fixture below without a new `CircuitSource` impl per gadget.
struct FixtureSource {
    share_count: usize,
    secret_count: usize,
    output_count: usize,
    random_count: usize,
    names: Vec<String>,
    deps: Vec<Dependency>,
    has_input_rands: bool,
}

impl CircuitSource for FixtureSource {
    fn share_count(&self) -> usize {
        self.share_count
    }
    fn secret_count(&self) -> usize {
        self.secret_count
    }
    fn output_count(&self) -> usize {
        self.output_count
    }
    fn random_count(&self) -> usize {
        self.random_count
    }
    fn correction_output_count(&self) -> usize {
        0
    }
    fn nb_duplications(&self) -> usize {
        1
    }
    fn has_input_rands(&self) -> bool {
        self.has_input_rands
    }
    fn wire_count(&self) -> usize {
        self.deps.len()
    }
    fn wire_name(&self, index: usize) -> String {
        self.names[index].clone()
    }
    fn dependency(&self, index: usize) -> Dependency {
        self.deps[index].clone()
    }
    fn correction_output_expansion(&self, _correction_index: usize) -> Vec<Dependency> {
        Vec::new()
    }
}

struct FixtureMults {
    share_count: usize,
    random_count: usize,
    terms: Vec<(String, Dependency, Dependency)>,
}

impl MultSource for FixtureMults {
    fn mult_count(&self) -> usize {
        self.terms.len()
    }
    fn mult_name(&self, index: usize) -> String {
        self.terms[index].0.clone()
    }
    fn operands(&self, index: usize) -> (Dependency, Dependency) {
        (self.terms[index].1.clone(), self.terms[index].2.clone())
    }
}

fn input_share(share_count: usize, random_count: usize, secret: usize, share: usize) -> Dependency {
    let mut dep = Dependency::empty(share_count, random_count, 0, 0);
    dep.secrets[secret][share] = true;
    dep
}

fn random_wire(share_count: usize, random_count: usize, random: usize) -> Dependency {
    let mut dep = Dependency::empty(share_count, random_count, 0, 0);
    dep.randoms[random] = true;
    dep
}

fn xor(deps: &[&Dependency]) -> Dependency {
    let mut out = deps[0].clone();
    for dep in &deps[1..] {
        for i in 0..2 {
            for (a, b) in out.secrets[i].iter_mut().zip(&dep.secrets[i]) {
                *a ^= b;
            }
        }
        for (a, b) in out.randoms.iter_mut().zip(&dep.randoms) {
            *a ^= b;
        }
        out.constant ^= dep.constant;
    }
    out
}

/// Two-share linear refresh `y_i = x_i xor r` for a single fresh random `r` (§8).
pub fn linear_refresh() -> (Circuit, Vec<String>) {
    let share_count = 2;
    let random_count = 1;
    let x0 = input_share(share_count, random_count, 0, 0);
    let x1 = input_share(share_count, random_count, 0, 1);
    let r = random_wire(share_count, random_count, 0);
    let y0 = xor(&[&x0, &r]);
    let y1 = xor(&[&x1, &r]);

    let source = FixtureSource {
        share_count,
        secret_count: 1,
        output_count: 1,
        random_count,
        names: vec!["x0".into(), "x1".into(), "r".into(), "y0".into(), "y1".into()],
        deps: vec![x0, x1, r, y0, y1],
        has_input_rands: false,
    };
    let mults = FixtureMults {
        share_count,
        random_count,
        terms: Vec::new(),
    };
    let names = source.names.clone();
    (Circuit::from_source(&source, &mults).unwrap(), names)
}

/// The trivial identity gadget `y_i = x_i`, `n=2` (§8): fails 1-NI since the tuple `{y0, y1}`
/// leaks both shares of the single input.
pub fn identity_gadget() -> (Circuit, Vec<String>) {
    let share_count = 2;
    let x0 = input_share(share_count, 0, 0, 0);
    let x1 = input_share(share_count, 0, 0, 1);

    let source = FixtureSource {
        share_count,
        secret_count: 1,
        output_count: 1,
        random_count: 0,
        names: vec!["x0".into(), "x1".into(), "y0".into(), "y1".into()],
        deps: vec![x0.clone(), x1.clone(), x0, x1],
        has_input_rands: false,
    };
    let mults = FixtureMults {
        share_count,
        random_count: 0,
        terms: Vec::new(),
    };
    let names = source.names.clone();
    (Circuit::from_source(&source, &mults).unwrap(), names)
}

/// A single-wire gadget that copies `x_0` with `n=1` share (§8): `RP` on it has
/// `coeffs = [0, 1]`.
pub fn single_wire_copy() -> (Circuit, Vec<String>) {
    let share_count = 1;
    let x0 = input_share(share_count, 0, 0, 0);

    let source = FixtureSource {
        share_count,
        secret_count: 1,
        output_count: 1,
        random_count: 0,
        names: vec!["x0".into(), "y0".into()],
        deps: vec![x0.clone(), x0],
        has_input_rands: false,
    };
    let mults = FixtureMults {
        share_count,
        random_count: 0,
        terms: Vec::new(),
    };
    let names = source.names.clone();
    (Circuit::from_source(&source, &mults).unwrap(), names)
}

/// The Ishai-Sahai-Wistar two-share multiplication gadget, `n=2`, one fresh random (§8):
/// `c0 = a0*b0 xor r`, `c1 = a1*b1 xor a0*b1 xor a1*b0 xor r`. 1-NI holds. The textbook 1-SNI
/// counter-example for this gadget combines a raw input share with an output probe after
/// dimension reduction has dropped that share from the candidate pool (see
/// `properties::sni::tests` and DESIGN.md for why this driver reports it secure instead).
pub fn isw_mult_n2() -> (Circuit, Vec<String>) {
    let share_count = 2;
    let random_count = 1;

    let a0 = input_share(share_count, random_count, 0, 0);
    let a1 = input_share(share_count, random_count, 0, 1);
    let b0 = input_share(share_count, random_count, 1, 0);
    let b1 = input_share(share_count, random_count, 1, 1);
    let r = random_wire(share_count, random_count, 0);

    let mult_term = |name: &str, left: &Dependency, right: &Dependency| (name.to_string(), left.clone(), right.clone());
    let terms = vec![
        mult_term("a0b0", &a0, &b0),
        mult_term("a0b1", &a0, &b1),
        mult_term("a1b0", &a1, &b0),
        mult_term("a1b1", &a1, &b1),
    ];

    let mut a0b0 = Dependency::empty(share_count, random_count, 0, 4);
    a0b0.mults[0] = true;
    let mut a0b1 = Dependency::empty(share_count, random_count, 0, 4);
    a0b1.mults[1] = true;
    let mut a1b0 = Dependency::empty(share_count, random_count, 0, 4);
    a1b0.mults[2] = true;
    let mut a1b1 = Dependency::empty(share_count, random_count, 0, 4);
    a1b1.mults[3] = true;

    let c0 = xor(&[&a0b0, &r]);
    let c1 = xor(&[&a1b1, &a0b1, &a1b0, &r]);

    let source = FixtureSource {
        share_count,
        secret_count: 2,
        output_count: 1,
        random_count,
        names: vec![
            "a0".into(),
            "a1".into(),
            "b0".into(),
            "b1".into(),
            "r".into(),
            "c0".into(),
            "c1".into(),
        ],
        deps: vec![a0, a1, b0, b1, r, c0, c1],
        has_input_rands: false,
    };
    let mults = FixtureMults {
        share_count,
        random_count,
        terms,
    };
    let names = source.names.clone();
    (Circuit::from_source(&source, &mults).unwrap(), names)
}

/// A two-output copy gadget, `n=2`: each output independently refreshes the same input with its
/// own fresh random, `y0_i = x_i xor r0`, `y1_i = x_i xor r1` (§9, Open Question b). Used to
/// exercise `verify_copy`'s `first_output` prefix against a gadget that actually has a second
/// output share to leave out of the sweep.
pub fn two_output_copy() -> (Circuit, Vec<String>) {
    let share_count = 2;
    let random_count = 2;
    let x0 = input_share(share_count, random_count, 0, 0);
    let x1 = input_share(share_count, random_count, 0, 1);
    let r0 = random_wire(share_count, random_count, 0);
    let r1 = random_wire(share_count, random_count, 1);
    let y0_0 = xor(&[&x0, &r0]);
    let y0_1 = xor(&[&x1, &r0]);
    let y1_0 = xor(&[&x0, &r1]);
    let y1_1 = xor(&[&x1, &r1]);

    let source = FixtureSource {
        share_count,
        secret_count: 1,
        output_count: 2,
        random_count,
        names: vec![
            "x0".into(),
            "x1".into(),
            "r0".into(),
            "r1".into(),
            "y0_0".into(),
            "y0_1".into(),
            "y1_0".into(),
            "y1_1".into(),
        ],
        deps: vec![x0, x1, r0, r1, y0_0, y0_1, y1_0, y1_1],
        has_input_rands: false,
    };
    let mults = FixtureMults {
        share_count,
        random_count,
        terms: Vec::new(),
    };
    let names = source.names.clone();
    (Circuit::from_source(&source, &mults).unwrap(), names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_refresh_has_one_random_and_two_outputs() {
        let (circuit, _) = linear_refresh();
        assert_eq!(circuit.random_count, 1);
        assert_eq!(circuit.output_wire_range().len(), 2);
    }

    #[test]
    fn isw_mult_builds_four_mult_terms() {
        let (circuit, _) = isw_mult_n2();
        assert_eq!(circuit.mults.len(), 4);
        assert!(circuit.contains_mults);
    }

    #[test]
    fn identity_gadget_has_no_randoms() {
        let (circuit, _) = identity_gadget();
        assert_eq!(circuit.random_count, 0);
    }

    #[test]
    fn two_output_copy_has_two_randoms_and_four_output_shares() {
        let (circuit, _) = two_output_copy();
        assert_eq!(circuit.random_count, 2);
        assert_eq!(circuit.output_wire_range().len(), 4);
    }
}
