use std::sync::Arc;
use std::thread;

use requery::{QueryToken, RuleIndex};

fn main() {
    let index = Arc::new(
        RuleIndex::from_rules(
            "cheap notebook =>\n\
             \tDELETE: cheap\n\
             running shoe* =>\n\
             \tFILTER: sports\n\
             iphone* =>\n\
             \tUP(500): apple\n",
        )
        .expect("failed to compile rules"),
    );

    let queries = [
        "cheap notebook deals",
        "running shoes",
        "iphone16 case",
        "nothing to see",
    ];

    let handles: Vec<_> = queries
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let idx = Arc::clone(&index);
            thread::spawn(move || {
                let query: Vec<QueryToken> =
                    text.split_whitespace().map(QueryToken::new).collect();
                let actions = idx.rewrite(&query);
                println!("Thread {i}: '{text}' -> {} action(s)", actions.len());
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
