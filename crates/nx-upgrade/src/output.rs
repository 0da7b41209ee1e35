use upgrade_core::PipelineOutputs;

use crate::environment;
use crate::error::Result;

/// Prints the outputs and hands them to the CI runner when it collects them.
pub(crate) fn publish(outputs: &PipelineOutputs) -> Result<()> {
    let entries = outputs.entries();
    print!("{}", render(&entries));

    if let Some(path) = environment::output_file() {
        environment::append_outputs(&path, &entries)?;
    }
    Ok(())
}

fn render(entries: &[(&'static str, String)]) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use upgrade_core::VersionInfo;

    #[test]
    fn renders_published_run() {
        let versions = VersionInfo::parse("21.6.2", "22.0.0").expect("valid versions");
        let outputs = PipelineOutputs::from_versions(&versions).with_pull_request(Some(17));

        assert_eq!(
            render(&outputs.entries()),
            "current-version=21.6.2\nlatest-version=22.0.0\nis-major-update=true\n\
             is-migrated=true\npull-request=17\n"
        );
    }

    #[test]
    fn failed_run_renders_empty_placeholders() {
        assert_eq!(
            render(&PipelineOutputs::default().entries()),
            "current-version=\nlatest-version=\nis-major-update=false\nis-migrated=false\npull-request=\n"
        );
    }
}
