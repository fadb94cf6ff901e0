use assert_cmd::cargo::cargo_bin_cmd;

fn help_text(args: &[&str]) -> String {
    let mut cmd = cargo_bin_cmd!("reelhousectl");
    let output = cmd
        .args(args)
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn top_level_help_lists_commands() {
    let text = help_text(&[]);
    for command in ["submit", "search", "shelves", "continue-watching", "history", "my-list"] {
        assert!(text.contains(command), "help missing '{command}'");
    }
}

#[test]
fn submit_help_mentions_required_fields() {
    let text = help_text(&["submit"]);
    assert!(text.contains("--title"), "submit help missing --title");
    assert!(text.contains("--video"), "submit help missing --video");
    assert!(text.contains("--poster"), "submit help missing --poster");
    assert!(text.contains("REELHOUSE_USER_ID"), "submit help missing user env");
}

#[test]
fn db_subcommands_present() {
    let text = help_text(&["db"]);
    assert!(text.contains("migrate"), "db help missing migrate");
}

#[test]
fn image_url_prints_delivery_url_without_a_database() {
    let mut cmd = cargo_bin_cmd!("reelhousectl");
    let output = cmd
        .env("IMAGES_DELIVERY_URL", "https://imagedelivery.test/hash/")
        .env_remove("DATABASE_URL")
        .args(["image-url", "abc123", "--variant", "thumbnail"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    assert_eq!(text.trim(), "https://imagedelivery.test/hash/abc123/thumbnail");
}

#[test]
fn unknown_variant_is_rejected() {
    let mut cmd = cargo_bin_cmd!("reelhousectl");
    cmd.args(["image-url", "abc123", "--variant", "poster"])
        .assert()
        .failure();
}
