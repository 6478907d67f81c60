use std::path::PathBuf;
use std::sync::Arc;
use crate::files::*;

#[test]
fn test_internal_resolver() {
    let resolver = InternalFileHandleResolver::new("assets");
    let handle = resolver.resolve("ui/skin.png");
    assert_eq!(handle.file_type(), FileType::Internal);
    assert_eq!(handle.file_path(), PathBuf::from("assets/ui/skin.png"));
}

#[test]
fn test_external_and_classpath_resolvers() {
    let external = ExternalFileHandleResolver::new("/home/player");
    assert_eq!(external.resolve("save.dat").file_type(), FileType::External);

    let classpath = ClasspathFileHandleResolver::new("res");
    let handle = classpath.resolve("fonts/default.fnt");
    assert_eq!(handle.file_type(), FileType::Classpath);
    assert_eq!(handle.file_path(), PathBuf::from("res/fonts/default.fnt"));
}

#[test]
fn test_absolute_resolver_ignores_root() {
    let handle = AbsoluteFileHandleResolver.resolve("/opt/game/data.bin");
    assert_eq!(handle.file_type(), FileType::Absolute);
    assert_eq!(handle.file_path(), PathBuf::from("/opt/game/data.bin"));
}

#[test]
fn test_resolve_does_not_touch_file_system() {
    let resolver = InternalFileHandleResolver::new("/definitely/not/here");
    let handle = resolver.resolve("missing.png");
    assert!(!handle.exists());
}

#[test]
fn test_prefix_resolver_prepends_verbatim() {
    let mut resolver = PrefixFileHandleResolver::new(
        Arc::new(InternalFileHandleResolver::new("assets")),
        "hd/",
    );
    assert_eq!(resolver.prefix(), "hd/");
    assert_eq!(resolver.resolve("ui/button.png").path(), "hd/ui/button.png");

    resolver.set_prefix("sd_");
    assert_eq!(resolver.resolve("button.png").path(), "sd_button.png");

    resolver.set_base(Arc::new(AbsoluteFileHandleResolver));
    assert_eq!(resolver.resolve("x").file_type(), FileType::Absolute);
    assert_eq!(resolver.base().resolve("y").path(), "y");
}
