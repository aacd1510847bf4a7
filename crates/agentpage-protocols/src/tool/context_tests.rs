use super::*;

#[test]
fn test_tool_context_new() {
    let ctx = ToolContext::new("stdio", PathBuf::from("/tmp"));
    assert_eq!(ctx.session_id, "stdio");
    assert_eq!(ctx.work_dir, PathBuf::from("/tmp"));
    assert!(!ctx.call_id.is_empty());
    assert!(!ctx.is_cancelled());
}

#[test]
fn test_cancel_is_shared_between_clones() {
    let ctx = ToolContext::new("stdio", PathBuf::from("/tmp"));
    let handle = ctx.clone();
    handle.cancel();
    assert!(ctx.is_cancelled());
}

#[test]
fn test_call_ids_unique() {
    let a = ToolContext::new("stdio", PathBuf::from("/tmp"));
    let b = ToolContext::new("stdio", PathBuf::from("/tmp"));
    assert_ne!(a.call_id, b.call_id);
}
