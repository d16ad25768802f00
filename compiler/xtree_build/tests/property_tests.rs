//! Property-based tests for block assembly and parameter substitution.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::disallowed_types,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use xtree_build::shortcuts::{arg, block, var};
use xtree_build::{replace_parameters, ParameterReplacer};
use xtree_ir::{BinaryOp, Expr, Param, Ty};

// -- Strategies --

fn ty_strategy() -> impl Strategy<Value = Ty> {
    prop_oneof![Just(Ty::Int), Just(Ty::Str), Just(Ty::Bool)]
}

fn constant_of(ty: &Ty, seed: i64) -> Expr {
    match ty {
        Ty::Str => Expr::constant(format!("s{seed}").as_str()),
        Ty::Bool => Expr::constant(seed % 2 == 0),
        _ => Expr::constant(seed),
    }
}

proptest! {
    #[test]
    fn block_runs_lines_in_call_order(values in proptest::collection::vec(-999i64..1000, 1..10)) {
        let total = var::<i64>("total");
        let mut builder = block().parameter_with(&total, arg(0i64));
        for value in &values {
            builder = builder.try_line(total.assign(Expr::binary(
                BinaryOp::Add,
                Expr::binary(BinaryOp::Mul, total.expr().clone(), Expr::constant(31i64)),
                Expr::constant(*value),
            )));
        }
        let body = builder.line(&total).build().unwrap();

        let expected = values.iter().fold(0i64, |acc, value| acc * 31 + value);
        let result = xtree_eval::evaluate_closed(&body).unwrap();
        prop_assert_eq!(result.as_int(), Some(expected));
    }

    #[test]
    fn first_replacement_of_each_type_wins(
        pool in proptest::collection::vec(ty_strategy(), 0..6),
        wanted in ty_strategy(),
    ) {
        let replacements: Vec<Expr> = pool
            .iter()
            .enumerate()
            .map(|(i, ty)| constant_of(ty, i64::try_from(i).unwrap()))
            .collect();
        let param = Param::named(wanted.clone(), "p");
        let replaced = replace_parameters(&param.to_expr(), &replacements);

        match pool.iter().position(|ty| *ty == wanted) {
            Some(first) => {
                prop_assert_eq!(replaced.to_string(), replacements[first].to_string());
            }
            None => prop_assert!(replaced.as_parameter().is_some()),
        }
    }

    #[test]
    fn replacing_is_idempotent(pool in proptest::collection::vec(ty_strategy(), 1..6)) {
        let replacements: Vec<Expr> = pool
            .iter()
            .enumerate()
            .map(|(i, ty)| constant_of(ty, i64::try_from(i).unwrap()))
            .collect();
        let tree = Expr::block(
            Vec::new(),
            vec![
                Param::named(Ty::Int, "a").to_expr(),
                Param::named(Ty::Str, "b").to_expr(),
                Param::named(Ty::Bool, "c").to_expr(),
            ],
        );
        let mut replacer = ParameterReplacer::new(replacements);
        let once = replacer.replace(&tree);
        let twice = replacer.replace(&once);
        prop_assert_eq!(once.to_string(), twice.to_string());
    }
}
