use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use vmx_config::InventorySettings;
use vmx_logging::{LogOutput, LogSettings};
use vmx_provider::mock::{MockCall, MockControl};
use vmx_provider::{GuiRegistry, Inventory, MachineStatus};

fn write_vmx(root: &Path, bundle: &str, name: &str, extra: &str) -> PathBuf {
    let dir = root.join(bundle);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.vmx", name));
    let body = format!(
        ".encoding = \"UTF-8\"\ndisplayName = \"{}\"\nmemsize = \"1024\"\n{}",
        name, extra
    );
    fs::write(&path, body).unwrap();
    path
}

struct Fixture {
    _temp_dir: TempDir,
    web: PathBuf,
    db: PathBuf,
    desktop: PathBuf,
    settings: InventorySettings,
}

fn fixture() -> Fixture {
    // Every test shares one subscriber; later calls leave it in place.
    let _ = vmx_logging::init_with(&LogSettings {
        level: "warn".to_string(),
        output: LogOutput::Console,
        json: false,
        file_path: PathBuf::from("/tmp/vmx-tests.log"),
    });

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let web = write_vmx(root, "web.vmwarevm", "web", "numvcpus = \"2\"\n");
    let db = write_vmx(root, "servers/db.vmwarevm", "db", "");
    let desktop = write_vmx(root, "desktop.vmwarevm", "desktop", "");
    write_vmx(root, "broken.vmwarevm", "broken", "memsize = \"lots\"\n");
    fs::write(root.join("web.vmwarevm/notes.txt"), "not a machine").unwrap();

    let settings = InventorySettings {
        directories: vec![root.to_path_buf()],
        gui_inventory_path: None,
        ..InventorySettings::default()
    };
    Fixture {
        _temp_dir: temp_dir,
        web,
        db,
        desktop,
        settings,
    }
}

fn open(fx: &Fixture, control: Arc<MockControl>) -> Inventory {
    let contents = format!("vmlist1.config = \"{}\"\n", fx.desktop.display());
    let registry = GuiRegistry::parse_str(Path::new("vmInventory"), &contents).unwrap();
    Inventory::with_registry(fx.settings.clone(), control, registry)
}

#[test]
fn test_scan_skips_invalid_files_and_sorts() {
    let fx = fixture();
    let inventory = open(&fx, Arc::new(MockControl::new()));

    let paths: Vec<&Path> = inventory.iter().map(|vm| vm.path()).collect();
    let mut expected = vec![fx.desktop.as_path(), fx.db.as_path(), fx.web.as_path()];
    expected.sort();
    assert_eq!(paths, expected);

    let web = inventory.get(&fx.web).unwrap();
    assert_eq!(web.cores(), 2);
    assert_eq!(web.memory(), 1024);
}

#[test]
fn test_overlapping_directories_are_deduplicated() {
    let fx = fixture();
    let mut settings = fx.settings.clone();
    settings
        .directories
        .push(fx.db.parent().unwrap().parent().unwrap().to_path_buf());
    let inventory = Inventory::with_registry(
        settings,
        Arc::new(MockControl::new()),
        GuiRegistry::default(),
    );
    assert_eq!(inventory.len(), 3);
}

#[test]
fn test_headless_follows_registry() {
    let fx = fixture();
    let inventory = open(&fx, Arc::new(MockControl::new()));
    assert!(!inventory.get(&fx.desktop).unwrap().headless());
    assert!(inventory.get(&fx.web).unwrap().headless());
}

#[test]
fn test_match_names() {
    let fx = fixture();
    let inventory = open(&fx, Arc::new(MockControl::new()));

    let names = |patterns: &[&str]| -> Vec<String> {
        inventory
            .match_names(patterns)
            .iter()
            .map(|vm| vm.display_name())
            .collect()
    };

    assert_eq!(names(&["web"]), vec!["web"]);
    assert_eq!(names(&["w*,d*"]), vec!["web", "desktop", "db"]);
    assert_eq!(names(&["*", "web"]).len(), 3);
    assert_eq!(names(&[]).len(), 3);
    assert!(names(&["nothing*"]).is_empty());
}

#[test]
fn test_status() {
    let fx = fixture();
    let control = Arc::new(MockControl::with_running([fx.web.clone()]));
    fs::write(fx.db.parent().unwrap().join("db-1234.vmem"), b"").unwrap();
    let inventory = open(&fx, control);

    let status = |path: &Path| inventory.status(inventory.get(path).unwrap()).unwrap();
    assert_eq!(status(&fx.web), MachineStatus::Running);
    assert_eq!(status(&fx.db), MachineStatus::Suspended);
    assert_eq!(status(&fx.desktop), MachineStatus::Stopped);
}

#[test]
fn test_start_uses_machine_headless_flag() {
    let fx = fixture();
    let control = Arc::new(MockControl::new());
    let inventory = open(&fx, control.clone());

    assert!(inventory.start(inventory.get(&fx.web).unwrap(), None).unwrap());
    assert!(inventory
        .start(inventory.get(&fx.desktop).unwrap(), None)
        .unwrap());
    // Already running.
    assert!(!inventory.start(inventory.get(&fx.web).unwrap(), Some(false)).unwrap());

    assert_eq!(
        control.calls(),
        vec![
            MockCall::Start {
                path: fx.web.clone(),
                headless: true
            },
            MockCall::Start {
                path: fx.desktop.clone(),
                headless: false
            },
        ]
    );
}

#[test]
fn test_stop_only_running() {
    let fx = fixture();
    let control = Arc::new(MockControl::with_running([fx.web.clone()]));
    let inventory = open(&fx, control.clone());

    assert!(!inventory.stop(inventory.get(&fx.db).unwrap()).unwrap());
    assert!(inventory.stop(inventory.get(&fx.web).unwrap()).unwrap());
    assert_eq!(control.calls(), vec![MockCall::Stop(fx.web.clone())]);
}

#[test]
fn test_suspend_and_resume_all() {
    let fx = fixture();
    let control = Arc::new(MockControl::with_running([
        fx.web.clone(),
        fx.desktop.clone(),
    ]));
    let inventory = open(&fx, control.clone());
    let web = inventory.get(&fx.web).unwrap();
    let desktop = inventory.get(&fx.desktop).unwrap();

    assert!(inventory.suspend(web, true).unwrap());
    assert!(inventory.suspend(desktop, true).unwrap());
    assert!(web.autoresume());
    // Only headless machines get the marker.
    assert!(!desktop.autoresume());

    let resumed = inventory.resume_all().unwrap();
    assert_eq!(resumed, vec![fx.web.clone()]);
    assert!(!web.autoresume());
    assert!(inventory.is_running(web).unwrap());
    assert!(!inventory.is_running(desktop).unwrap());
}

#[test]
fn test_resume_matching_limits_to_patterns() {
    let fx = fixture();
    let control = Arc::new(MockControl::with_running([fx.web.clone(), fx.db.clone()]));
    let inventory = open(&fx, control.clone());
    let web = inventory.get(&fx.web).unwrap();
    let db = inventory.get(&fx.db).unwrap();

    inventory.suspend(web, true).unwrap();
    inventory.suspend(db, true).unwrap();

    assert_eq!(inventory.resume_matching(&["d*"]).unwrap(), vec![fx.db.clone()]);
    assert!(web.autoresume());
    assert!(!db.autoresume());
    assert!(inventory.resume_matching(&["nothing"]).unwrap().is_empty());

    assert_eq!(inventory.resume_all().unwrap(), vec![fx.web.clone()]);
}

#[test]
fn test_suspend_without_autoresume_leaves_no_marker() {
    let fx = fixture();
    let control = Arc::new(MockControl::with_running([fx.web.clone()]));
    let inventory = open(&fx, control);
    let web = inventory.get(&fx.web).unwrap();

    assert!(inventory.suspend(web, false).unwrap());
    assert!(!web.autoresume());
    assert!(inventory.resume_all().unwrap().is_empty());
}

#[test]
fn test_control_failure_propagates() {
    let fx = fixture();
    let control = Arc::new(MockControl::new());
    control.fail_with("vmrun exploded");
    let inventory = open(&fx, control);

    let err = inventory
        .start(inventory.get(&fx.web).unwrap(), None)
        .unwrap_err();
    assert!(err.to_string().contains("vmrun exploded"));
}

#[test]
fn test_custom_autoresume_filename() {
    let fx = fixture();
    let mut settings = fx.settings.clone();
    settings.autoresume_filename = ".resume-me".to_string();
    let control = Arc::new(MockControl::with_running([fx.web.clone()]));
    let inventory = Inventory::with_registry(settings, control, GuiRegistry::default());
    let web = inventory.get(&fx.web).unwrap();

    inventory.suspend(web, true).unwrap();
    assert!(fx.web.parent().unwrap().join(".resume-me").is_file());
}
