//! Control bits realizing a permutation on the switching network.

use crate::topology::{self, Topology};

/// Checks that `perm` is a permutation of `[0, perm.len())`.
pub fn is_permutation(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    perm.iter().all(|&i| {
        i < seen.len() && !std::mem::replace(&mut seen[i], true)
    })
}

/// Control bits of every switch position, level-major.
///
/// Bit `0` routes a switch straight, bit `1` crosses it. Unused positions are unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    topology: Topology,
    bits: Vec<bool>,
}

impl Routing {
    /// Computes the control bits which route input `perm[i]` to output `i`.
    ///
    /// # Panics
    ///
    /// Panics if `perm` is not a permutation, see [`is_permutation`].
    pub fn new(perm: &[usize]) -> Self {
        assert!(is_permutation(perm), "routing requires a permutation");

        let topology = Topology::new(perm.len());
        let mut bits = vec![false; topology.slots()];
        route(&topology, perm, 0, 0, &mut bits);

        Self { topology, bits }
    }

    /// Returns the topology of the network.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Returns the control bit of the switch at `(level, width)`.
    pub fn bit(&self, level: usize, width: usize) -> bool {
        self.bits[self.topology.index(level, width)]
    }

    /// Returns the control bits of every switch position at `level`.
    pub fn level(&self, level: usize) -> &[bool] {
        let width = self.topology.width();
        &self.bits[level * width..(level + 1) * width]
    }
}

/// Permutes `n` wires by simulating the network, returning the input routed to
/// each output.
#[cfg(test)]
pub(crate) fn simulate(routing: &Routing) -> Vec<usize> {
    fn run(routing: &Routing, level: usize, offset: usize, wires: &mut [usize]) {
        let n = wires.len();
        let switch = |level: usize, width: usize, wires: &mut [usize]| {
            if routing.bit(level, width) {
                wires.swap(0, 1);
            }
        };

        match n {
            0 | 1 => {}
            2 => switch(level, offset, wires),
            3 => {
                switch(level, offset, &mut wires[..2]);
                switch(level + 1, offset, &mut wires[1..]);
                switch(level + 2, offset, &mut wires[..2]);
            }
            _ => {
                let half = topology::top_len(n);
                for k in 0..half {
                    switch(level, offset + k, &mut wires[2 * k..2 * k + 2]);
                }

                let mut top: Vec<usize> = (0..half).map(|k| wires[2 * k]).collect();
                let mut bottom: Vec<usize> = (0..half).map(|k| wires[2 * k + 1]).collect();
                if n % 2 == 1 {
                    bottom.push(wires[n - 1]);
                }

                run(routing, level + 1, offset, &mut top);
                run(routing, level + 1, offset + topology::bottom_offset(n), &mut bottom);

                for k in 0..half {
                    wires[2 * k] = top[k];
                    wires[2 * k + 1] = bottom[k];
                }
                if n % 2 == 1 {
                    wires[n - 1] = bottom[half];
                }

                let right = level + topology::levels(n) - 1;
                for k in 0..half {
                    switch(right, offset + k, &mut wires[2 * k..2 * k + 2]);
                }
            }
        }
    }

    let mut wires: Vec<usize> = (0..routing.topology.num()).collect();
    run(routing, 0, 0, &mut wires);
    wires
}

/// Which sub-network a wire is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
}

impl std::ops::Not for Side {
    type Output = Side;

    fn not(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

fn route(topology: &Topology, perm: &[usize], level: usize, offset: usize, bits: &mut [bool]) {
    let n = perm.len();
    let mut set = |level: usize, width: usize, bit: bool| {
        bits[topology.index(level, width)] = bit;
    };

    match n {
        0 | 1 => {}
        2 => set(level, offset, perm[0] == 1),
        3 => {
            let [b0, b1, b2] = route_three(perm);
            set(level, offset, b0);
            set(level + 1, offset, b1);
            set(level + 2, offset, b2);
        }
        _ => {
            let half = topology::top_len(n);
            let (inputs, outputs) = color(perm);

            let right = level + topology::levels(n) - 1;
            for k in 0..half {
                set(level, offset + k, inputs[2 * k] == Side::Bottom);
                set(right, offset + k, outputs[2 * k] == Side::Bottom);
            }

            let mut top = vec![0; half];
            let mut bottom = vec![0; n - half];
            for (o, side) in outputs.iter().enumerate() {
                match side {
                    Side::Top => top[o / 2] = perm[o] / 2,
                    Side::Bottom => bottom[o / 2] = perm[o] / 2,
                }
            }

            route(topology, &top, level + 1, offset, bits);
            route(
                topology,
                &bottom,
                level + 1,
                offset + topology::bottom_offset(n),
                bits,
            );
        }
    }
}

/// Finds the bits of the three switches `(0, 1)`, `(1, 2)`, `(0, 1)` realizing `perm`.
fn route_three(perm: &[usize]) -> [bool; 3] {
    (0..8u8)
        .map(|config| [config & 1 == 1, config & 2 == 2, config & 4 == 4])
        .find(|bits| {
            let mut wires = [0, 1, 2];
            for (bit, pair) in bits.iter().zip([0, 1, 0]) {
                if *bit {
                    wires.swap(pair, pair + 1);
                }
            }
            wires[..] == *perm
        })
        // The three switches generate all of S3.
        .expect("every permutation of three wires is routable")
}

/// Assigns every input and output of a network on `n >= 4` wires to a sub-network.
///
/// The two inputs of a left switch, and the two outputs of a right switch, are
/// assigned to different sub-networks, and output `o` is assigned to the same
/// sub-network as input `perm[o]`. For odd `n` the unpaired last input and output
/// are assigned to the bottom sub-network.
fn color(perm: &[usize]) -> (Vec<Side>, Vec<Side>) {
    let n = perm.len();
    let mut inverse = vec![0; n];
    for (o, &i) in perm.iter().enumerate() {
        inverse[i] = o;
    }

    let mut inputs: Vec<Option<Side>> = vec![None; n];
    let mut outputs: Vec<Option<Side>> = vec![None; n];

    if n % 2 == 1 {
        walk(perm, &inverse, &mut inputs, &mut outputs, n - 1, Side::Bottom);
    }
    for k in 0..n / 2 {
        if outputs[2 * k].is_none() {
            walk(perm, &inverse, &mut inputs, &mut outputs, 2 * k, Side::Top);
        }
    }

    let unwrap = |sides: Vec<Option<Side>>| -> Vec<Side> {
        sides
            .into_iter()
            .map(|side| side.expect("every wire is assigned a side"))
            .collect()
    };

    (unwrap(inputs), unwrap(outputs))
}

/// Follows the constraints from `output`, assigning `side` to it, until reaching
/// an unpaired wire or closing a cycle.
fn walk(
    perm: &[usize],
    inverse: &[usize],
    inputs: &mut [Option<Side>],
    outputs: &mut [Option<Side>],
    mut output: usize,
    side: Side,
) {
    let n = perm.len();
    loop {
        outputs[output] = Some(side);
        let input = perm[output];
        inputs[input] = Some(side);

        let sibling = input ^ 1;
        if sibling >= n || inputs[sibling].is_some() {
            return;
        }
        inputs[sibling] = Some(!side);
        let next = inverse[sibling];
        outputs[next] = Some(!side);

        let sibling = next ^ 1;
        if sibling >= n || outputs[sibling].is_some() {
            return;
        }
        output = sibling;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn permutations(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![vec![]];
        }
        permutations(n - 1)
            .into_iter()
            .flat_map(|perm| {
                (0..n).map(move |pos| {
                    let mut perm = perm.clone();
                    perm.insert(pos, n - 1);
                    perm
                })
            })
            .collect()
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[]));
        assert!(is_permutation(&[2, 0, 1]));
        assert!(!is_permutation(&[0, 0, 1]));
        assert!(!is_permutation(&[0, 3, 1]));
    }

    #[rstest]
    #[case::one(1)]
    #[case::two(2)]
    #[case::three(3)]
    #[case::four(4)]
    #[case::five(5)]
    #[case::six(6)]
    #[case::seven(7)]
    fn test_route_all_permutations(#[case] n: usize) {
        for perm in permutations(n) {
            let routing = Routing::new(&perm);
            assert_eq!(simulate(&routing), perm, "failed to route {perm:?}");
        }
    }

    #[test]
    fn test_route_two() {
        assert_eq!(Routing::new(&[0, 1]).level(0), &[false]);
        assert_eq!(Routing::new(&[1, 0]).level(0), &[true]);
    }

    #[test]
    fn test_route_identity_large() {
        let perm: Vec<usize> = (0..1000).collect();
        assert_eq!(simulate(&Routing::new(&perm)), perm);
    }

    #[test]
    fn test_color_constraints() {
        let perm = [4, 8, 0, 6, 2, 1, 7, 5, 3];
        let (inputs, outputs) = color(&perm);

        for k in 0..4 {
            assert_ne!(inputs[2 * k], inputs[2 * k + 1]);
            assert_ne!(outputs[2 * k], outputs[2 * k + 1]);
        }
        for (o, &i) in perm.iter().enumerate() {
            assert_eq!(outputs[o], inputs[i]);
        }
        assert_eq!(inputs[8], Side::Bottom);
        assert_eq!(outputs[8], Side::Bottom);
    }

    #[test]
    #[should_panic]
    fn test_route_rejects_non_permutation() {
        Routing::new(&[0, 0]);
    }
}
