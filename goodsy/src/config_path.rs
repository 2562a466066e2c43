use std::fs;

pub fn get() -> String {
    let config_path = match std::env::var("GS_CONFIG_PATH") {
        Ok(path) => path,
        Err(_) => "config.yml".to_owned(),
    };

    if fs::metadata(&config_path).is_err() {
        gs_log::panic(
            None,
            format!("[Goodsy] Config file {config_path} specified in GS_CONFIG_PATH environment variable or current directory must exist"),
        );
    }

    config_path
}
