//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::Utils::engine_config::EngineConfig;
    use crate::symbolic::algebra_engine::AlgebraEngine;
    use crate::symbolic::errors::AlgebraError;
    use crate::symbolic::evaluate::{Bindings, Value};
    use crate::symbolic::expr_tree::Node;
    use crate::symbolic::operators::Builtin;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn bind(pairs: &[(&str, f64)]) -> Bindings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn eval_at(engine: &AlgebraEngine, node: &Node, pairs: &[(&str, f64)]) -> f64 {
        engine
            .evaluate(node, &bind(pairs))
            .unwrap()
            .as_number()
            .unwrap()
    }

    fn derivative_at(text: &str, x: f64) -> f64 {
        let engine = AlgebraEngine::new();
        let tree = engine.parse(text).unwrap();
        let d = engine.derivate(&tree, "x").unwrap().unwrap();
        eval_at(&engine, &d, &[("x", x)])
    }

    #[test]
    fn test_precedence() {
        let engine = AlgebraEngine::new();
        let empty = Bindings::new();
        assert_eq!(engine.evaluate_text("1+2*3", &empty).unwrap(), 7.0);
        assert_eq!(engine.evaluate_text("(1+2)*3", &empty).unwrap(), 9.0);
        assert_eq!(engine.evaluate_text("2*3+4*5", &empty).unwrap(), 26.0);
        assert_eq!(engine.evaluate_text("10-4-3", &empty).unwrap(), 3.0);
        assert_eq!(engine.evaluate_text("2^10", &empty).unwrap(), 1024.0);
        assert_eq!(engine.evaluate_text("1+2^3*2", &empty).unwrap(), 17.0);
    }

    #[test]
    fn test_builtin_functions() {
        let engine = AlgebraEngine::new();
        let empty = Bindings::new();
        assert_relative_eq!(engine.evaluate_text("sin(0)", &empty).unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(engine.evaluate_text("sin(pi/2)", &empty).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(engine.evaluate_text("log(2, 8)", &empty).unwrap(), 3.0, epsilon = 1e-12);
        assert_eq!(engine.evaluate_text("expa(2, 3)", &empty).unwrap(), 8.0);
        assert_eq!(engine.evaluate_text("3*fact(4)", &empty).unwrap(), 72.0);
        assert_eq!(engine.evaluate_text("sqrt(16)+square(3)", &empty).unwrap(), 13.0);
        assert_eq!(engine.evaluate_text("neg(2)*3", &empty).unwrap(), -6.0);
    }

    #[test]
    fn test_front_form_and_nested_arguments() {
        let engine = AlgebraEngine::new();
        let tree = engine.parse("2*pow(x+1,2)+x").unwrap();
        assert_eq!(tree.infix(), "(2*pow(x+1, 2))+x");
        assert_eq!(eval_at(&engine, &tree, &[("x", 1.0)]), 9.0);
        let tree = engine.parse("x^2+y^2+z^2").unwrap();
        assert_eq!(eval_at(&engine, &tree, &[("x", 1.0), ("y", 2.0), ("z", 3.0)]), 14.0);
    }

    #[test]
    fn test_composed_unary_operators() {
        let engine = AlgebraEngine::new();
        let tree = engine.parse("sin cos (x+x)").unwrap();
        let expected = Node::unary(
            Builtin::Sin,
            Node::unary(Builtin::Cos, Node::var("x") + Node::var("x")),
        );
        assert_eq!(tree, expected);
        let simplified = engine.simplify(&tree, false).unwrap();
        assert_eq!(simplified.infix(), "sin(cos(2*x))");
        assert_relative_eq!(
            eval_at(&engine, &simplified, &[("x", 0.3)]),
            (0.6_f64).cos().sin(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_derivatives() {
        assert_relative_eq!(derivative_at("pow(x,3)", 2.0), 12.0);
        assert_relative_eq!(derivative_at("sin(2*x)", 0.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(derivative_at("x/(x+1)", 1.0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(derivative_at("2*pow(x+1,2)+x", 1.0), 9.0, epsilon = 1e-12);
        assert_relative_eq!(derivative_at("x^x", 1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(derivative_at("exp(square(x))", 0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_without_rule_is_none() {
        let engine = AlgebraEngine::new();
        let tree = engine.parse("fact(x)+x").unwrap();
        assert_eq!(engine.derivate(&tree, "x").unwrap(), None);
        let tree = engine.parse("fact(y)+x").unwrap();
        let d = engine.derivate(&tree, "x").unwrap().unwrap();
        assert_eq!(eval_at(&engine, &d, &[]), 1.0);
    }

    #[test]
    fn test_simplification() {
        let engine = AlgebraEngine::new();
        let coalesced = engine.simplify(&engine.parse("2*x+3*x").unwrap(), false).unwrap();
        assert_eq!(coalesced, engine.parse("5*x").unwrap());
        for x in [-2.0, 0.5, 3.0] {
            assert_relative_eq!(eval_at(&engine, &coalesced, &[("x", x)]), 5.0 * x);
        }
        let zero = engine.simplify(&engine.parse("x-x").unwrap(), false).unwrap();
        assert_eq!(zero, Node::c(0.0));
        let one = engine.simplify(&engine.parse("x/x").unwrap(), false).unwrap();
        assert_eq!(one, Node::c(1.0));
        let triple = engine.simplify(&engine.parse("x+x+x").unwrap(), false).unwrap();
        assert_eq!(triple.infix(), "3*x");
        let product = engine.simplify(&engine.parse("x*5*x*6*x*x").unwrap(), false).unwrap();
        assert_eq!(product.infix(), "30*pow(x, 4)");
        assert_eq!(eval_at(&engine, &product, &[("x", 2.0)]), 480.0);
    }

    #[test]
    fn test_simplify_force_numeric_first() {
        let engine = AlgebraEngine::new();
        let tree = engine.parse("2*pi*x").unwrap();
        let kept = engine.simplify(&tree, false).unwrap();
        assert!(kept.contains_var("pi"));
        let forced = engine.simplify(&tree, true).unwrap();
        assert!(!forced.contains_var("pi"));
        assert_relative_eq!(
            eval_at(&engine, &forced, &[("x", 1.0)]),
            2.0 * std::f64::consts::PI,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_bracket_mismatch() {
        let engine = AlgebraEngine::new();
        assert!(matches!(engine.parse("(1+2"), Err(AlgebraError::BracketMismatch(_))));
        assert!(matches!(engine.parse("1+2)"), Err(AlgebraError::BracketMismatch(_))));
        assert!(matches!(engine.parse("((x)"), Err(AlgebraError::BracketMismatch(_))));
    }

    #[test]
    fn test_structural_errors() {
        let engine = AlgebraEngine::new();
        assert_eq!(engine.parse("   "), Err(AlgebraError::EmptyExpression));
        assert!(matches!(engine.parse("()"), Err(AlgebraError::StructuralParse(_))));
        assert!(matches!(engine.parse("x y"), Err(AlgebraError::StructuralParse(_))));
        assert!(matches!(engine.parse("-x"), Err(AlgebraError::StructuralParse(_))));
        assert!(matches!(engine.parse("2*"), Err(AlgebraError::StructuralParse(_))));
        assert!(engine.parse("neg(x)").is_ok());
    }

    #[test]
    fn test_partial_evaluation_and_unresolved_symbols() {
        let engine = AlgebraEngine::new();
        let tree = engine.parse("x*y+1").unwrap();
        let value = engine.evaluate(&tree, &bind(&[("x", 2.0)])).unwrap();
        assert_eq!(value, Value::Expr(Node::c(2.0) * Node::var("y") + Node::c(1.0)));
        let err = engine.evaluate_text("x*y+1", &bind(&[("x", 2.0)]));
        assert!(matches!(err, Err(AlgebraError::UnresolvedSymbols(ref s)) if s.contains('y')));
        let tuple = engine.evaluate(&engine.parse("1, 2").unwrap(), &Bindings::new()).unwrap();
        assert_eq!(tuple, Value::Tuple(vec![1.0, 2.0]));
    }

    #[test]
    fn test_evaluate_batch() {
        let engine = AlgebraEngine::new();
        let tree = engine.parse("x^2").unwrap();
        let sets: Vec<Bindings> = (1..=3).map(|i| bind(&[("x", i as f64)])).collect();
        let values = engine.evaluate_batch(&tree, &sets).unwrap();
        assert_eq!(
            values,
            vec![Value::Number(1.0), Value::Number(4.0), Value::Number(9.0)]
        );
    }

    #[test]
    fn test_round_trip_through_infix() {
        let engine = AlgebraEngine::new();
        let inputs = [
            "2*pow(x+1,2)+x",
            "sin cos (x+x)",
            "x/(x+1)-3*x",
            "log(2, x*x)+expa(3, x)",
            "x-(2-x)",
        ];
        for text in inputs {
            let tree = engine.parse(text).unwrap();
            let again = engine.parse(&tree.infix()).unwrap();
            for x in [0.5, 1.5, 2.5] {
                assert_relative_eq!(
                    eval_at(&engine, &tree, &[("x", x)]),
                    eval_at(&engine, &again, &[("x", x)]),
                    epsilon = 1e-12
                );
            }
        }
        let negative = engine.simplify(&engine.parse("0-2*x").unwrap(), false).unwrap();
        let again = engine.parse(&negative.infix()).unwrap();
        assert_eq!(eval_at(&engine, &again, &[("x", 1.0)]), -2.0);
    }

    #[test]
    fn test_custom_operator() {
        let mut engine = AlgebraEngine::new();
        engine.register_operator(
            "mod",
            2,
            Some(2.0),
            Some(Arc::new(|args: &[f64]| args[0].rem_euclid(args[1]))),
            None,
        ).unwrap();
        let empty = Bindings::new();
        assert_eq!(engine.evaluate_text("7 mod 3", &empty).unwrap(), 1.0);
        assert_eq!(engine.evaluate_text("1+7 mod 3", &empty).unwrap(), 2.0);
        assert_eq!(engine.evaluate_text("mod(7, 3)", &empty).unwrap(), 1.0);
        let tree = engine.parse("x mod 3").unwrap();
        assert_eq!(tree.infix(), "mod(x, 3)");
        assert_eq!(engine.derivate(&tree, "x").unwrap(), None);
    }

    #[test]
    fn test_custom_operator_with_derivative_rule() {
        let mut engine = AlgebraEngine::new();
        engine.register_operator(
            "cube",
            1,
            None,
            Some(Arc::new(|args: &[f64]| args[0].powi(3))),
            Some(Arc::new(|args: &[&Node], derivs: &[Node]| {
                let a = args[0].clone();
                Some(Node::c(3.0) * Node::pow(a, Node::c(2.0)) * derivs[0].clone())
            })),
        ).unwrap();
        let tree = engine.parse("cube(2*x)").unwrap();
        assert_eq!(eval_at(&engine, &tree, &[("x", 1.0)]), 8.0);
        let d = engine.derivate(&tree, "x").unwrap().unwrap();
        assert_relative_eq!(eval_at(&engine, &d, &[("x", 1.0)]), 24.0, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_bracket_and_priority() {
        let mut engine = AlgebraEngine::new();
        engine.register_bracket("[", "]");
        let empty = Bindings::new();
        assert_eq!(engine.evaluate_text("[1+2]*3", &empty).unwrap(), 9.0);
        assert_eq!(engine.evaluate_text("[(1+1)*2]^2", &empty).unwrap(), 16.0);
        engine.set_priority("+", 3.0);
        assert_eq!(engine.evaluate_text("2*3+4", &empty).unwrap(), 14.0);
    }

    #[test]
    fn test_engines_do_not_share_overrides() {
        let mut tuned = AlgebraEngine::new();
        tuned.set_priority("+", 3.0);
        let plain = AlgebraEngine::new();
        let empty = Bindings::new();
        assert_eq!(tuned.evaluate_text("2*3+4", &empty).unwrap(), 14.0);
        assert_eq!(plain.evaluate_text("2*3+4", &empty).unwrap(), 10.0);
    }

    #[test]
    fn test_depth_guard() {
        let engine = AlgebraEngine::new();
        let n = 600;
        let deep = format!("{}x{}", "sin(".repeat(n), ")".repeat(n));
        assert_eq!(
            engine.parse(&deep),
            Err(AlgebraError::DepthExceeded { depth: n, limit: 512 })
        );
        // no brackets: the finished tree is measured instead
        let chain = vec!["x"; 600].join("+");
        assert_eq!(
            engine.parse(&chain),
            Err(AlgebraError::DepthExceeded { depth: 600, limit: 512 })
        );
        let mut shallow = AlgebraEngine::new();
        shallow.set_max_depth(3);
        assert!(shallow.parse("sin(x)+1").is_ok());
        let tree = AlgebraEngine::new().parse("sin(sin(x))+1").unwrap();
        assert!(matches!(
            shallow.simplify(&tree, false),
            Err(AlgebraError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_front_form_under_power_round_trips() {
        let engine = AlgebraEngine::new();
        let samples = [("x", 1.5), ("y", 0.75)];
        for text in ["x^(pow(y,3))", "2^(log(2,x))", "x^(expa(2,x))", "(sin(x))^(neg(2))"] {
            let tree = engine.parse(text).unwrap();
            let again = engine.parse(&tree.infix()).unwrap();
            assert_eq!(again, tree, "{}", text);
        }
        let tree = engine.parse("2^(log(2,x))").unwrap();
        assert_relative_eq!(eval_at(&engine, &tree, &[("x", 3.0)]), 3.0, epsilon = 1e-12);
        let simplified = engine
            .simplify(&engine.parse("((x)^((pi)*(pi)))/(x)").unwrap(), false)
            .unwrap();
        let again = engine.parse(&simplified.infix()).unwrap();
        assert_relative_eq!(
            eval_at(&engine, &again, &samples),
            eval_at(&engine, &simplified, &samples),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_postfix_factorial_applies_last() {
        let engine = AlgebraEngine::new();
        let empty = Bindings::new();
        assert_eq!(engine.evaluate_text("3!", &empty).unwrap(), 6.0);
        assert_eq!(engine.evaluate_text("3!+1", &empty).unwrap(), 24.0);
        assert_eq!(engine.evaluate_text("(3!)+1", &empty).unwrap(), 7.0);
        assert_eq!(engine.evaluate_text("fact(3)+1", &empty).unwrap(), 7.0);
    }

    #[test]
    fn test_very_deep_input_is_rejected() {
        let engine = AlgebraEngine::new();
        let n = 200_000;
        let balanced = format!("{}x{}", "sin(".repeat(n), ")".repeat(n));
        assert!(matches!(
            engine.parse(&balanced),
            Err(AlgebraError::DepthExceeded { .. })
        ));
        let unbalanced = format!("{}x{}", "sin(".repeat(n), ")".repeat(n - 1));
        assert!(engine.parse(&unbalanced).is_err());
        let closers = format!("x{}", ")".repeat(n));
        assert!(engine.parse(&closers).is_err());
    }

    #[test]
    fn test_dropping_deep_tree() {
        let mut node = Node::var("x");
        for _ in 0..200_000 {
            node = Node::unary(Builtin::Sin, node);
        }
        let engine = AlgebraEngine::new();
        assert!(matches!(
            engine.evaluate(&node, &Bindings::new()),
            Err(AlgebraError::DepthExceeded { depth: 200_001, limit: 512 })
        ));
        drop(node);
    }

    #[test]
    fn test_engine_from_config() {
        let config = EngineConfig::from_document(
            "engine\n  max_depth: 4\npriority\n  set: +=3\nbrackets\n  pairs: []\n",
        )
        .unwrap();
        let engine = AlgebraEngine::with_config(&config);
        assert_eq!(engine.max_depth(), 4);
        let empty = Bindings::new();
        assert_eq!(engine.evaluate_text("[1]*2+3", &empty).unwrap(), 5.0);
        assert!(matches!(
            engine.parse("sin(sin(sin(sin(x))))"),
            Err(AlgebraError::DepthExceeded { depth: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_dump_ast_of_parsed_tree() {
        let engine = AlgebraEngine::new();
        let tree = engine.parse("x*sin(y)").unwrap();
        let dump = tree.dump_ast();
        assert_eq!(dump.lines().count(), 4);
        assert!(dump.lines().next().unwrap().starts_with("*"));
    }
}
