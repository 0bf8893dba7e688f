use super::*;

#[test]
fn test_title_and_body() {
    assert_eq!(postprocess_markdown("hello", Some("Report")), "# Report\n\nhello\n");
}

#[test]
fn test_no_title() {
    assert_eq!(postprocess_markdown("\n\nhello  \n\n\n", None), "\n\nhello\n");
}

#[test]
fn test_failed_image_reference_leaves_no_gap() {
    let body = "![](images/doc-image-001.png)\n\n![]()\n\n![](images/doc-image-003.png)";
    let out = postprocess_markdown(body, Some("Doc"));
    assert_eq!(
        out,
        "# Doc\n\n![](images/doc-image-001.png)\n\n![](images/doc-image-003.png)\n"
    );
}

#[test]
fn test_steps_run_in_order() {
    // removing the image leaves a run of blank lines for the collapse step
    let body = "1\\. Intro   \n\n![alt]()\n\n\n2\\. Next";
    let out = postprocess_markdown(body, Some("T"));
    assert_eq!(out, "# T\n\n1. Intro\n\n2. Next\n");
}

#[test]
fn test_collapse_is_idempotent_on_pipeline_output() {
    let out = postprocess_markdown("a\n\n\n\nb\n\n\n\n\nc", Some("x"));
    assert_eq!(collapse_blank_lines(&out), out);
}
