use std::fmt::Write as _;

use dialoguer::Input;
use docintel_core::{Answer, Session};
use docintel_llm::AnyEmbedder;

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// Read questions from the terminal until an empty line or `exit`.
pub async fn run(session: &Session<AnyEmbedder>) -> anyhow::Result<()> {
    println!("Ask a question about the document (empty line or `exit` to quit).\n");

    loop {
        let question = tokio::task::spawn_blocking(|| {
            Input::<String>::new()
                .with_prompt("Question")
                .allow_empty(true)
                .interact_text()
        })
        .await??;

        let question = question.trim();
        if is_exit(question) {
            return Ok(());
        }

        let answer = session.ask(question).await?;
        println!("{}", render(&answer));
    }
}

fn is_exit(input: &str) -> bool {
    input.is_empty() || EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

fn render(answer: &Answer) -> String {
    let mut out = format!(
        "Answer: {}\nConfidence: {:.2}\n",
        answer.answer, answer.confidence
    );
    if let Some(source) = &answer.source {
        let _ = writeln!(out, "Source: {source}");
    }
    out
}
