use crate::{
    ThemeAction, ThemeArgs,
    config::FolioConfig,
    preference::{FileStore, Theme, ThemePreference},
};

pub async fn run(args: &ThemeArgs) -> Result<(), anyhow::Error> {
    let config = FolioConfig::load_from_arg(args.config_file.as_deref()).await?;
    let mut preference = ThemePreference::new(FileStore::new(&config.preferences.path));

    let theme = match &args.action {
        None | Some(ThemeAction::Get) => preference.get()?,
        Some(ThemeAction::Set { theme }) => {
            let theme: Theme = theme.parse()?;
            preference.set(theme)?;
            theme
        }
        Some(ThemeAction::Toggle) => preference.toggle()?,
    };

    println!("{theme}");
    Ok(())
}
