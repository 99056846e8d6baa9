use requery::{QueryToken, RuleIndex};

fn main() {
    // Compile a small rule file
    let index = RuleIndex::from_rules(
        "cheap notebook =>\n\
         \tDELETE: cheap\n\
         \tUP(10): affordable\n\
         iphone* =>\n\
         \tUP(500): apple\n\
         \tFILTER: model_$1\n\
         \"gift card\" =>\n\
         \tDECORATE(redirect): /gift-cards\n",
    )
    .expect("failed to compile rules");

    println!("{index}");

    // Match a tokenized query and apply the fired rules
    let query: Vec<QueryToken> = "cheap notebook iphone16"
        .split_whitespace()
        .map(QueryToken::new)
        .collect();

    for m in index.matches(&query) {
        println!(
            "matched {} at {}..{} (capture: {:?})",
            m.instructions(),
            m.start(),
            m.start() + m.len(),
            m.capture()
        );
    }

    for action in index.rewrite(&query) {
        println!("action: {action:?}");
    }
}
