//! The `gradebook init` command.

use std::path::Path;

use anyhow::Result;

use gradebook_store::config::SAMPLE_CONFIG;

pub fn execute() -> Result<()> {
    write_if_absent(Path::new("gradebook.toml"), SAMPLE_CONFIG)?;
    write_if_absent(Path::new("donnees_eleves.csv"), SAMPLE_DATA)?;

    println!("\nNext steps:");
    println!("  1. Run: gradebook validate");
    println!("  2. Create an account: gradebook users add --username admin --new-password <pw> --role admin");
    println!("  3. Fix a row: gradebook correct --numero <NUMERO> --date 01/01/2010 --user admin --password <pw>");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_DATA: &str = "\
CODE,Numero,Nom,Prenom,Date de naissance,Classe,Note
C001,AB12345,Diallo,Awa,15/04/02,4iemA,Math[10|14:16] #Francais[12:9.5]
C002,AB12346,Ba,Oumar,2003-01-09,3emb,Math[8|11:12] #Anglais[15:14]
C003,ab12347,Sow,Fatou,01.09.2004,5 em a,Math[17:18]
C004,AB12348,Ndiaye,Moussa,31/02/2003,6emB,Math[9:10]
";
