use anyhow::Result;
use magpie_browser::BrowserFinder;
use std::path::PathBuf;

pub fn execute(browser_path: Option<PathBuf>) -> Result<()> {
    let finder = BrowserFinder::new(browser_path);
    let executable = finder.find()?;
    println!("Browser: {}", executable.display());

    if let Some(home) = dirs::home_dir() {
        let profiles = home.join(".magpie").join("profiles");
        if profiles.is_dir() {
            println!("Profiles: {}", profiles.display());
        } else {
            println!("Profiles: none yet (created on first --profile run)");
        }
    }

    println!("Credentials: set X_USERNAME and X_PASSWORD in the environment");

    Ok(())
}
