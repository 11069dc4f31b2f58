// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]
use RustedAlgebra::Examples::algebra_examples::algebra_examples;
use RustedAlgebra::Utils::logger::init_logger;

fn main() {
    if let Err(e) = init_logger(Some("info"), false) {
        eprintln!("logger is not available: {}", e);
    }
    let example = 1;
    match example {
        0 => {
            // parse, evaluate with full and partial bindings, error values
            algebra_examples(0);
        }
        1 => {
            // derivatives of builtins, simplified
            algebra_examples(1);
        }
        2 => {
            // simplification rules
            algebra_examples(2);
        }
        3 => {
            // levelled tree dump
            algebra_examples(3);
        }
        4 => {
            // custom operators and bracket pairs
            algebra_examples(4);
        }
        5 => {
            // engine from a config document, batch evaluation
            algebra_examples(5);
        }
        _ => {
            println!("example {} does not exist", example);
        }
    }
}
