//! App-tag command - inventory an app and optionally tag the devices that have it

use clap::Args;
use mdmsync_reconcile::jobs::app_tag::{self, AppTagOptions};

use super::{publish, Backends, JobArgs};
use crate::config::ConfigPaths;
use crate::error::CliResult;

/// Arguments for the app-tag command
#[derive(Args, Debug)]
pub struct AppTagArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// App display name, used in the report file name
    #[arg(long = "app", value_name = "NAME")]
    pub app_name: String,

    /// Bundle id shared by the iOS and Android builds
    #[arg(long, value_name = "BUNDLE_ID", conflicts_with_all = ["ios_bundle", "android_bundle"])]
    pub bundle_id: Option<String>,

    /// iOS bundle id
    #[arg(long, value_name = "BUNDLE_ID")]
    pub ios_bundle: Option<String>,

    /// Android package name
    #[arg(long, value_name = "BUNDLE_ID")]
    pub android_bundle: Option<String>,

    /// Existing custom attribute key to set on every device found
    #[arg(long, requires = "value")]
    pub key: Option<String>,

    /// Value to set for --key
    #[arg(long, requires = "key")]
    pub value: Option<String>,
}

impl AppTagArgs {
    fn options(&self) -> AppTagOptions {
        let (ios_bundle_id, android_bundle_id) = match &self.bundle_id {
            Some(shared) => (Some(shared.clone()), Some(shared.clone())),
            None => (self.ios_bundle.clone(), self.android_bundle.clone()),
        };

        AppTagOptions {
            app_name: self.app_name.clone(),
            ios_bundle_id,
            android_bundle_id,
            tag: self.key.clone().zip(self.value.clone()),
        }
    }
}

/// Execute the app-tag command
pub async fn execute(args: AppTagArgs, paths: &ConfigPaths) -> CliResult<()> {
    let options = args.options();
    options.validate()?;

    let backends = Backends::connect(paths, false)?;
    let report = app_tag::run(&backends.context(&args.job), &options).await?;
    publish(paths, &report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AppTagArgs {
        AppTagArgs {
            job: JobArgs::default(),
            app_name: "Outlook".to_string(),
            bundle_id: None,
            ios_bundle: None,
            android_bundle: None,
            key: None,
            value: None,
        }
    }

    #[test]
    fn test_shared_bundle_id_fills_both_platforms() {
        let args = AppTagArgs {
            bundle_id: Some("com.microsoft.office.outlook".to_string()),
            ..args()
        };
        let options = args.options();
        assert_eq!(
            options.ios_bundle_id.as_deref(),
            Some("com.microsoft.office.outlook")
        );
        assert_eq!(options.ios_bundle_id, options.android_bundle_id);
        assert!(options.tag.is_none());
    }

    #[test]
    fn test_tag_from_key_and_value() {
        let args = AppTagArgs {
            ios_bundle: Some("com.microsoft.Office.Outlook".to_string()),
            key: Some("outlook".to_string()),
            value: Some("installed".to_string()),
            ..args()
        };
        let options = args.options();
        assert!(options.android_bundle_id.is_none());
        assert_eq!(
            options.tag,
            Some(("outlook".to_string(), "installed".to_string()))
        );
    }

    #[test]
    fn test_no_bundle_is_rejected() {
        assert!(args().options().validate().is_err());
    }
}
