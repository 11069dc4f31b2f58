// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::Utils::engine_config::EngineConfig;
use crate::symbolic::algebra_engine::AlgebraEngine;
use crate::symbolic::evaluate::Bindings;
use crate::symbolic::expr_tree::Node;
use std::sync::Arc;

#[allow(dead_code)]
pub fn algebra_examples(example: usize) {
    match example {
        0 => {
            // PARSE AND EVALUATE
            let engine = AlgebraEngine::new();
            let input = "2*pow(x, 2) + sin(y)/3 - ln(E)";
            // tokens with their nesting levels
            for token in engine.tokenize(input) {
                println!("{:>6} {:>8} level {}", token.text, token.kind, token.level);
            }
            match engine.parse(input) {
                Ok(tree) => {
                    println!("parsed: {}", tree);
                    println!("variables: {:?}", tree.variables());
                    let mut bindings = Bindings::new();
                    bindings.insert("x".to_string(), 1.5);
                    // y is left unbound: the result keeps it as a symbol
                    let partial = engine.evaluate(&tree, &bindings);
                    println!("partial result: {:?}", partial.map(|v| v.to_string()));
                    bindings.insert("y".to_string(), 0.5);
                    let full = engine.evaluate(&tree, &bindings);
                    println!("full result: {:?}", full.map(|v| v.to_string()));
                }
                Err(e) => println!("error: {}", e),
            }
            // errors are values, not panics
            for bad in ["(1+2", "1+2)", "x y", "-x", ""] {
                println!("{:>6} -> {:?}", bad, engine.parse(bad).err());
            }
        }
        1 => {
            // DERIVATIVES
            let engine = AlgebraEngine::new();
            let inputs = [
                "x*sin(x)",
                "pow(x, 3) + 2*x",
                "ln(x)/x",
                "log(2, x)",
                "expa(2, x)",
                "arctan(x^2)",
            ];
            for input in inputs {
                let tree = engine.parse(input).unwrap();
                let d = engine.derivate(&tree, "x").unwrap();
                match d {
                    Some(d) => {
                        let simplified = engine.simplify(&d, false).unwrap();
                        println!("d/dx {} = {}", input, simplified);
                    }
                    None => println!("d/dx {} has no rule", input),
                }
            }
            // factorial has no derivative rule
            let tree = engine.parse("fact(x)").unwrap();
            println!("d/dx fact(x) = {:?}", engine.derivate(&tree, "x").unwrap());
        }
        2 => {
            // SIMPLIFICATION
            let engine = AlgebraEngine::new();
            for input in ["x*1 + 0", "2*x + 3*x", "x - x", "5*(2*pow(x, 4))", "(1+2)*y"] {
                let tree = engine.parse(input).unwrap();
                println!("{} => {}", input, engine.simplify(&tree, false).unwrap());
            }
            // numeric folding of whole subtrees first
            let tree = engine.parse("sin(0) + cos(0)*x").unwrap();
            println!("forced: {}", engine.simplify(&tree, true).unwrap());
        }
        3 => {
            // AST DUMP
            let engine = AlgebraEngine::new();
            let tree = engine.parse("(2*pow(x+1, 2))+x").unwrap();
            println!("{}", tree.dump_ast());
            let built = Node::var("a") * Node::c(3.0) + Node::pow(Node::var("b"), Node::c(2.0));
            println!("{}", built.dump_ast());
        }
        4 => {
            // CUSTOM OPERATORS AND BRACKETS
            let mut engine = AlgebraEngine::new();
            engine.register_operator(
                "mod",
                2,
                Some(2.0),
                Some(Arc::new(|a: &[f64]| a[0].rem_euclid(a[1]))),
                None,
            ).unwrap();
            // cube(u) with derivative 3*u^2*u'
            engine.register_operator(
                "cube",
                1,
                None,
                Some(Arc::new(|a: &[f64]| a[0].powi(3))),
                Some(Arc::new(|args: &[&Node], d: &[Node]| {
                    let u = args[0].clone();
                    Some(Node::c(3.0) * Node::pow(u, Node::c(2.0)) * d[0].clone())
                })),
            ).unwrap();
            engine.register_bracket("[", "]");
            let empty = Bindings::new();
            println!("[1+9] mod 4 = {:?}", engine.evaluate_text("[1+9] mod 4", &empty));
            let tree = engine.parse("cube(2*x)").unwrap();
            let d = engine.derivate(&tree, "x").unwrap().unwrap();
            println!("d/dx cube(2*x) = {}", engine.simplify(&d, false).unwrap());
            // the default engine does not see these registrations
            println!("default engine: {:?}", AlgebraEngine::new().parse("[x]").err());
        }
        5 => {
            // CONFIGURATION AND BATCH EVALUATION
            let document = "engine\n  max_depth: 64\npriority\n  set: +=3\nbrackets\n  pairs: []\n";
            let config = match EngineConfig::from_document(document) {
                Ok(config) => config,
                Err(e) => {
                    println!("bad config: {}", e);
                    return;
                }
            };
            let engine = AlgebraEngine::with_config(&config);
            let tree = engine.parse("[x+1]*2").unwrap();
            let points: Vec<Bindings> = (0..5)
                .map(|i| {
                    let mut b = Bindings::new();
                    b.insert("x".to_string(), i as f64);
                    b
                })
                .collect();
            for (b, value) in points.iter().zip(engine.evaluate_batch(&tree, &points).unwrap()) {
                println!("x = {} -> {}", b["x"], value);
            }
        }
        _ => {
            println!("no such example");
        }
    }
}
