use crate::actions::Runner;
use crate::config::AppConfig;

pub struct AppContext<'a> {
    pub config: AppConfig,
    pub runner: &'a mut Runner,
}

impl<'a> AppContext<'a> {
    pub fn new(config: AppConfig, runner: &'a mut Runner) -> Self {
        Self { config, runner }
    }
}
