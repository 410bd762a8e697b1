use log::*;

pub(crate) mod helper {
    use i18n_embed::fluent::{fluent_language_loader, FluentLanguageLoader};
    use i18n_embed::LanguageLoader;
    use once_cell::sync::Lazy;
    use rust_embed::RustEmbed;

    #[derive(RustEmbed)]
    #[folder = "i18n/"]
    pub(crate) struct Localizations;

    pub(crate) static LANGUAGE_LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
        let loader: FluentLanguageLoader = fluent_language_loader!();
        loader
            .load_fallback_language(&Localizations)
            .expect("Error while loading fallback language");
        loader
    });

    macro_rules! fl {
        ($message_id:literal) => {{
            i18n_embed_fl::fl!($crate::localization::helper::LANGUAGE_LOADER, $message_id)
        }};

        ($message_id:literal, $($args:tt)*) => {{
            i18n_embed_fl::fl!($crate::localization::helper::LANGUAGE_LOADER, $message_id, $($args)*)
        }};
    }

    pub(crate) use fl;
}

pub(crate) fn init() {
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    if let Err(error) = i18n_embed::select(&*helper::LANGUAGE_LOADER, &helper::Localizations, &requested_languages) {
        warn!("Cannot select user interface language: {error}");
    }
}
