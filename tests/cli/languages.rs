use anyhow::Result;

use crate::{CliTest, stdout_of};

#[test]
fn lists_supported_languages() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("languages").output()?;
    assert_eq!(output.status.code(), Some(0));

    let listing = stdout_of(&output);
    assert!(listing.contains("c"));
    assert!(listing.contains(".cpp"));
    assert!(listing.contains("python"));
    assert!(listing.contains(".py"));
    Ok(())
}
