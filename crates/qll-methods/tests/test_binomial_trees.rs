//! Structural properties of the binomial tree parametrizations.
//!
//! Every parametrization must produce a recombining, arbitrage-free tree:
//! `i + 1` nodes at layer `i`, prices strictly increasing across a layer, and
//! a risk-neutral probability inside [0, 1] that makes the discounted
//! underlying a martingale.

use proptest::prelude::*;
use qll_methods::{BlackScholesLattice, TreeKind, TreeParametrization};
use qll_processes::MarketSnapshot;

fn market() -> impl Strategy<Value = MarketSnapshot> {
    (
        10.0f64..200.0,
        -0.02f64..0.08,
        0.0f64..0.05,
        0.10f64..0.60,
        0.25f64..3.0,
    )
        .prop_map(|(spot, r, q, vol, t)| MarketSnapshot::new(spot, r, q, vol, t))
}

fn tree_kind() -> impl Strategy<Value = TreeKind> {
    prop::sample::select(TreeKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn probability_and_no_arbitrage(
        m in market(),
        kind in tree_kind(),
        steps in 20usize..300,
        moneyness in 0.9f64..1.1,
    ) {
        let tree = kind.build(&m, steps, m.spot * moneyness).unwrap();
        let growth = m.growth(tree.dt());
        let p = tree.probability(0);
        prop_assert!((0.0..=1.0).contains(&p), "{}: p = {}", tree.name(), p);
        prop_assert!(tree.down() < growth, "{}: d = {} >= {}", tree.name(), tree.down(), growth);
        prop_assert!(growth < tree.up(), "{}: u = {} <= {}", tree.name(), tree.up(), growth);
        let expected = p * tree.up() + (1.0 - p) * tree.down();
        prop_assert!((expected - growth).abs() < 1e-12);
    }

    #[test]
    fn layers_are_recombining_and_ordered(
        m in market(),
        kind in tree_kind(),
        steps in 10usize..60,
    ) {
        let tree = kind.build(&m, steps, m.spot).unwrap();
        let lattice = BlackScholesLattice::new(tree).unwrap();
        prop_assert_eq!(lattice.time_grid().size(), lattice.tree().steps() + 1);
        for i in 0..=lattice.tree().steps() {
            let prices = lattice.prices(i);
            prop_assert_eq!(prices.len(), i + 1);
            prop_assert!(prices.windows(2).all(|w| w[0] < w[1]));
        }
        // Recombination: up then down lands where down then up does.
        let ud = lattice.underlying(2, 1);
        let expected = m.spot * lattice.tree().up() * lattice.tree().down();
        prop_assert!((ud - expected).abs() <= 1e-10 * expected);
    }
}

#[test]
fn default_tree_is_crr() {
    let m = MarketSnapshot::new(50.0, 0.04, 0.0, 0.15, 314.0 / 365.0);
    let tree = TreeKind::default().build(&m, 100, 47.0).unwrap();
    assert_eq!(tree.name(), "Cox-Ross-Rubinstein");
    assert!((tree.up() * tree.down() - 1.0).abs() < 1e-14);
}
