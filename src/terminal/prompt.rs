use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};

pub fn prompt(text: &str) -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(text)
        .interact_text()?)
}

pub fn prompt_with_default(text: &str, default: String) -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(text)
        .default(default)
        .interact_text()?)
}
