use mxl_relm4_components::relm4::gtk::glib;

fn from_glib_level(level: &glib::LogLevel) -> (&'static str, log::Level) {
    match &level {
        glib::LogLevel::Critical => ("critical", log::Level::Error),
        glib::LogLevel::Error => ("error", log::Level::Error),
        glib::LogLevel::Warning => ("warning", log::Level::Warn),
        glib::LogLevel::Info => ("info", log::Level::Info),
        glib::LogLevel::Debug => ("debug", log::Level::Debug),
        glib::LogLevel::Message => ("message", log::Level::Trace),
    }
}

fn module_path(domain: Option<&str>) -> String {
    match domain {
        Some(domain) => format!("glib::{domain}"),
        None => "glib".to_owned(),
    }
}

/// Routes GLib (and therefore GTK) log output into the `log` facade.
pub fn init_logging() {
    glib::log_set_default_handler(|domain, level, message| {
        let module_path = module_path(domain);
        let (glib_level, level) = from_glib_level(&level);
        let target = format!("{}|{}", glib_level, module_path);

        log::logger().log(
            &log::RecordBuilder::new()
                .args(format_args!("{}", message))
                .level(level)
                .target(target.as_str())
                .module_path(Some(module_path.as_str()))
                .build(),
        );
    });

    glib::log_set_writer_func(|level, log_fields| {
        let get_field = |key: &str| {
            log_fields
                .iter()
                .find_map(|f| if f.key() == key { f.value_str() } else { None })
        };

        let message = get_field("MESSAGE").unwrap_or("<empty message>");
        let file = get_field("CODE_FILE");
        let line = get_field("CODE_LINE").and_then(|s| s.parse::<u32>().ok());

        let misc_fields: Vec<_> = [("PRIORITY", "PRIORITY"), ("CODE_FUNC", "FUNC")]
            .iter()
            .filter_map(|(key, name)| get_field(key).map(|val| format!("{name}={val}")))
            .collect();

        let module_path = module_path(get_field("GLIB_DOMAIN"));
        let (glib_level, level) = from_glib_level(&level);
        let target = format!("{}|{}|{}", glib_level, module_path, misc_fields.join("|"));

        log::logger().log(
            &log::RecordBuilder::new()
                .args(format_args!("{}", message))
                .level(level)
                .target(target.as_str())
                .module_path(Some(module_path.as_str()))
                .file(file)
                .line(line)
                .build(),
        );

        glib::LogWriterOutput::Handled
    });
}
