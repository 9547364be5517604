//! The `quizboard init` command.

use std::path::Path;

use anyhow::Result;

use quizboard_sources::config::STARTER_CONFIG;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizboard.toml"), STARTER_CONFIG)?;

    std::fs::create_dir_all("data/north/march")?;
    write_if_missing(Path::new("data/north/march/level1.csv"), EXAMPLE_RESPONSES)?;
    write_if_missing(Path::new("data/north/march/level1_meta.csv"), EXAMPLE_META)?;

    println!("\nNext steps:");
    println!("  1. Point [source] in quizboard.toml at your exports");
    println!("  2. Run: quizboard summary --level 1 --location north --month march");
    println!("  3. Run: quizboard query --level 1 --location north --month march --sort \"Total score\" --desc");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const EXAMPLE_RESPONSES: &str = "\
Username,Full name,Full name [Score],What is 7 x 8?,What is 7 x 8? [Score],What is 7 x 8? [Feedback],Capital of France?,Capital of France? [Score],Total score
ada,Ada Lovelace,,56,5/5,Correct,Paris,5/5,10/10
alan,Alan Turing,,54,0/5,Check your times tables,Paris,5/5,5/10
grace,Grace Hopper,,56,5/5,,Lyon,0/5,5/10
edsger,Edsger Dijkstra,,48,0/5,,Marseille,0/5,0/10
";

const EXAMPLE_META: &str = "\
Question,Section,Type,CorrectAnswer
Full name,Personal Info,text,
What is 7 x 8?,Arithmetic,number,56
Capital of France?,Geography,text,Paris
";
