use imgsort::cli::{CategoryCommand, Command, ConfigCommand, run_command, run_session};
use imgsort::{
    AppPaths, CategoryError, CategoryStore, ImageEnumerator, OrganizeError, SettingsStore, Sorter,
};
/// Integration tests for imgsort
///
/// These tests drive the public API and the command dispatcher against a
/// temporary application root, checking what ends up on disk.
///
/// Test categories:
/// 1. Category management
/// 2. Settings
/// 3. Listing pending images
/// 4. Sorting
/// 5. Real-world scenarios
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary application root with the default directory layout.
struct TestFixture {
    temp_dir: TempDir,
    paths: AppPaths,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let paths = AppPaths::from_root(temp_dir.path());
        TestFixture { temp_dir, paths }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn settings(&self) -> SettingsStore {
        SettingsStore::new(&self.paths)
    }

    fn categories(&self) -> CategoryStore {
        CategoryStore::new(&self.paths)
    }

    fn input_dir(&self) -> PathBuf {
        self.settings().get_settings().input_dir
    }

    fn output_dir(&self) -> PathBuf {
        self.settings().get_settings().output_dir
    }

    /// Create a file with content in the input directory.
    fn create_image(&self, name: &str, content: &[u8]) -> PathBuf {
        let dir = self.input_dir();
        fs::create_dir_all(&dir).expect("Failed to create input directory");
        let file_path = dir.join(name);
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
        file_path
    }

    fn create_images(&self, names: &[&str]) {
        for name in names {
            self.create_image(name, name.as_bytes());
        }
    }

    fn run(&self, command: Command) -> anyhow::Result<()> {
        run_command(command, &self.paths)
    }

    fn add_categories(&self, names: &[&str]) {
        for name in names {
            self.run(Command::Categories(CategoryCommand::Add {
                name: name.to_string(),
            }))
            .expect("Failed to add category");
        }
    }

    fn category_names(&self) -> Vec<String> {
        self.categories()
            .get_categories()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    fn pending_names(&self) -> Vec<String> {
        let settings = self.settings();
        ImageEnumerator::new(&settings)
            .list_images()
            .expect("Failed to list images")
            .into_iter()
            .map(|image| image.name)
            .collect()
    }

    fn assert_sorted(&self, category: &str, name: &str) {
        let path = self.output_dir().join(category).join(name);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn count_sorted(&self, category: &str) -> usize {
        fs::read_dir(self.output_dir().join(category))
            .map(|entries| entries.flatten().count())
            .unwrap_or(0)
    }
}

// ============================================================================
// Test Suite 1: Category Management
// ============================================================================

#[test]
fn test_add_list_rename_remove_categories() {
    let fixture = TestFixture::new();
    fixture.add_categories(&["nature-photos", "city-views", "dogs"]);

    fixture
        .run(Command::Categories(CategoryCommand::List))
        .expect("Listing should succeed");

    fixture
        .run(Command::Categories(CategoryCommand::Rename {
            old_name: "city-views".to_string(),
            new_name: "street".to_string(),
        }))
        .expect("Rename should succeed");
    assert_eq!(fixture.category_names(), vec!["nature-photos", "street", "dogs"]);

    fixture
        .run(Command::Categories(CategoryCommand::Remove {
            name: "nature-photos".to_string(),
        }))
        .expect("Remove should succeed");
    assert_eq!(fixture.category_names(), vec!["street", "dogs"]);

    let raw = fs::read_to_string(fixture.paths.categories_file()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{"name": "street"}, {"name": "dogs"}])
    );
}

#[test]
fn test_category_errors_are_reported_to_caller() {
    let fixture = TestFixture::new();
    fixture.add_categories(&["dogs"]);

    let err = fixture
        .run(Command::Categories(CategoryCommand::Add {
            name: "dogs".to_string(),
        }))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CategoryError>(),
        Some(CategoryError::Duplicate(_))
    ));
    assert_eq!(err.to_string(), "Category 'dogs' already exists.");

    let err = fixture
        .run(Command::Categories(CategoryCommand::Add {
            name: "Big Dogs".to_string(),
        }))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CategoryError>(),
        Some(CategoryError::InvalidName(_))
    ));

    let err = fixture
        .run(Command::Categories(CategoryCommand::Remove {
            name: "cats".to_string(),
        }))
        .unwrap_err();
    assert_eq!(err.to_string(), "Category 'cats' not found.");

    assert_eq!(fixture.category_names(), vec!["dogs"]);
}

#[test]
fn test_corrupt_category_file_reads_as_empty_and_recovers() {
    let fixture = TestFixture::new();
    fs::create_dir_all(fixture.paths.data_dir()).unwrap();
    fs::write(fixture.paths.categories_file(), "[{\"name\": ").unwrap();

    assert!(fixture.category_names().is_empty());

    fixture.add_categories(&["fresh-start"]);
    assert_eq!(fixture.category_names(), vec!["fresh-start"]);
}

#[test]
fn test_hand_edited_entries_survive_category_commands() {
    let fixture = TestFixture::new();
    fs::create_dir_all(fixture.paths.data_dir()).unwrap();
    fs::write(
        fixture.paths.categories_file(),
        r#"[{"name": "dogs"}, {"name": "Holiday_2019", "note": "old import"}, {"name": "dogs"}]"#,
    )
    .unwrap();

    fixture.add_categories(&["cats"]);
    fixture
        .run(Command::Categories(CategoryCommand::Rename {
            old_name: "cats".to_string(),
            new_name: "kittens".to_string(),
        }))
        .unwrap();

    assert_eq!(
        fixture.category_names(),
        vec!["dogs", "Holiday_2019", "kittens"]
    );
    let raw = fs::read_to_string(fixture.paths.categories_file()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"name": "dogs"},
            {"name": "Holiday_2019", "note": "old import"},
            {"name": "dogs"},
            {"name": "kittens"}
        ])
    );
}

// ============================================================================
// Test Suite 2: Settings
// ============================================================================

#[test]
fn test_default_settings_live_under_root() {
    let fixture = TestFixture::new();

    assert_eq!(fixture.input_dir(), fixture.path().join("images"));
    assert_eq!(fixture.output_dir(), fixture.path().join("sorted-images"));
}

#[test]
fn test_config_commands_persist_directories() {
    let fixture = TestFixture::new();
    let inbox = fixture.path().join("inbox");
    let sorted = fixture.path().join("done");

    fixture
        .run(Command::Config(ConfigCommand::SetInput { dir: inbox.clone() }))
        .unwrap();
    fixture
        .run(Command::Config(ConfigCommand::SetOutput { dir: sorted.clone() }))
        .unwrap();
    fixture.run(Command::Config(ConfigCommand::Show)).unwrap();

    assert_eq!(fixture.input_dir(), inbox);
    assert_eq!(fixture.output_dir(), sorted);
    assert!(!sorted.exists(), "output directory is created lazily");
}

#[test]
fn test_corrupt_settings_fall_back_to_defaults() {
    let fixture = TestFixture::new();
    fs::create_dir_all(fixture.paths.data_dir()).unwrap();
    fs::write(fixture.paths.settings_file(), "definitely not json").unwrap();

    assert_eq!(fixture.input_dir(), fixture.paths.default_input_dir());
    assert_eq!(fixture.output_dir(), fixture.paths.default_output_dir());
    fixture.run(Command::List).expect("Listing should not fail");
}

#[test]
fn test_separate_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let paths = AppPaths::with_data_dir(temp_dir.path(), temp_dir.path().join("state"));

    CategoryStore::new(&paths).add_category("dogs").unwrap();
    SettingsStore::new(&paths)
        .set_output_dir(temp_dir.path().join("out"))
        .unwrap();

    assert!(temp_dir.path().join("state").join("categories.json").is_file());
    assert!(temp_dir.path().join("state").join("settings.json").is_file());
    assert!(!temp_dir.path().join("data").exists());
}

// ============================================================================
// Test Suite 3: Listing Pending Images
// ============================================================================

#[test]
fn test_list_filters_by_extension_case_insensitively() {
    let fixture = TestFixture::new();
    fixture.create_images(&["a.JPG", "b.txt", "c.png"]);

    assert_eq!(fixture.pending_names(), vec!["a.JPG", "c.png"]);
}

#[test]
fn test_list_creates_missing_input_directory() {
    let fixture = TestFixture::new();

    assert!(fixture.pending_names().is_empty());
    assert!(fixture.input_dir().is_dir());
    fixture.run(Command::List).unwrap();
}

#[test]
fn test_list_ignores_nested_output_directory() {
    let fixture = TestFixture::new();
    let input = fixture.input_dir();
    fixture
        .settings()
        .set_output_dir(input.join("sorted"))
        .unwrap();
    fixture.create_images(&["one.png", "two.gif"]);
    fixture.add_categories(&["dogs"]);

    fixture
        .run(Command::Sort {
            image: input.join("one.png"),
            category: "dogs".to_string(),
        })
        .unwrap();

    assert_eq!(fixture.pending_names(), vec!["two.gif"]);
    fixture.assert_sorted("dogs", "one.png");
}

// ============================================================================
// Test Suite 4: Sorting
// ============================================================================

#[test]
fn test_sort_moves_image_and_preserves_content() {
    let fixture = TestFixture::new();
    fixture.add_categories(&["dogs"]);
    let image = fixture.create_image("rex.jpeg", b"\xFF\xD8\xFF\xE0 jpeg payload");

    fixture
        .run(Command::Sort {
            image: image.clone(),
            category: "dogs".to_string(),
        })
        .unwrap();

    assert!(!image.exists());
    fixture.assert_sorted("dogs", "rex.jpeg");
    let content = fs::read(fixture.output_dir().join("dogs").join("rex.jpeg")).unwrap();
    assert_eq!(content, b"\xFF\xD8\xFF\xE0 jpeg payload");
    assert!(fixture.pending_names().is_empty());
}

#[test]
fn test_sort_collisions_are_numbered() {
    let fixture = TestFixture::new();
    let settings = fixture.settings();
    let sorter = Sorter::new(&settings);

    let mut destinations = Vec::new();
    for round in 0..3 {
        let image = fixture.create_image("photo.jpg", format!("round {round}").as_bytes());
        let sorted = sorter.sort_image(&image, "cat").unwrap();
        destinations.push(sorted.destination.file_name().unwrap().to_string_lossy().into_owned());
    }

    assert_eq!(destinations, vec!["photo.jpg", "photo_1.jpg", "photo_2.jpg"]);
    assert_eq!(fixture.count_sorted("cat"), 3);
    let second = fs::read_to_string(fixture.output_dir().join("cat").join("photo_1.jpg")).unwrap();
    assert_eq!(second, "round 1");
}

#[test]
fn test_sort_into_unregistered_category() {
    let fixture = TestFixture::new();
    let image = fixture.create_image("x.bmp", b"BM");

    fixture
        .run(Command::Sort {
            image,
            category: "not-registered".to_string(),
        })
        .expect("Sorting does not depend on the category list");

    fixture.assert_sorted("not-registered", "x.bmp");
    assert!(fixture.category_names().is_empty());
}

#[test]
fn test_sort_missing_image_fails_without_side_effects() {
    let fixture = TestFixture::new();

    let err = fixture
        .run(Command::Sort {
            image: fixture.path().join("ghost.png"),
            category: "dogs".to_string(),
        })
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<OrganizeError>(),
        Some(OrganizeError::SourceNotFound { .. })
    ));
    assert!(!fixture.output_dir().exists());
}

#[test]
fn test_sort_special_characters_in_filename() {
    let fixture = TestFixture::new();
    let name = "summer (2024) – beach #1.png";
    let image = fixture.create_image(name, b"png");

    fixture
        .run(Command::Sort {
            image,
            category: "holidays".to_string(),
        })
        .unwrap();

    fixture.assert_sorted("holidays", name);
}

#[test]
fn test_sort_all_moves_every_pending_image() {
    let fixture = TestFixture::new();
    fixture.add_categories(&["inbox-dump"]);
    fixture.create_images(&["a.png", "b.JPG", "c.webp", "notes.txt"]);

    fixture
        .run(Command::SortAll {
            category: "inbox-dump".to_string(),
        })
        .unwrap();

    assert_eq!(fixture.count_sorted("inbox-dump"), 3);
    assert!(fixture.pending_names().is_empty());
    assert!(fixture.input_dir().join("notes.txt").exists());
}

#[test]
fn test_sort_all_with_no_images_is_ok() {
    let fixture = TestFixture::new();

    fixture
        .run(Command::SortAll {
            category: "anything".to_string(),
        })
        .unwrap();

    assert!(!fixture.output_dir().exists());
}

#[test]
fn test_renaming_category_does_not_move_sorted_images() {
    let fixture = TestFixture::new();
    fixture.add_categories(&["old-name"]);
    let image = fixture.create_image("keep.png", b"png");
    fixture
        .run(Command::Sort {
            image,
            category: "old-name".to_string(),
        })
        .unwrap();

    fixture
        .run(Command::Categories(CategoryCommand::Rename {
            old_name: "old-name".to_string(),
            new_name: "new-name".to_string(),
        }))
        .unwrap();

    fixture.assert_sorted("old-name", "keep.png");
    assert!(!fixture.output_dir().join("new-name").exists());
}

// ============================================================================
// Test Suite 5: Real-world Scenarios
// ============================================================================

#[test]
fn test_full_workflow_configure_then_interactive_session() {
    let fixture = TestFixture::new();
    let camera_roll = fixture.path().join("camera-roll");
    let library = fixture.path().join("library");
    fixture.settings().set_input_dir(&camera_roll).unwrap();
    fixture.settings().set_output_dir(&library).unwrap();
    fixture.add_categories(&["people", "places", "food"]);
    fixture.create_images(&[
        "IMG_0001.jpg",
        "img_0002.PNG",
        "IMG_0003.jpg",
        "readme.md",
    ]);
    // An earlier run already produced a same-named file.
    fs::create_dir_all(library.join("places")).unwrap();
    fs::write(library.join("places").join("IMG_0003.jpg"), "older").unwrap();

    let mut output = Vec::new();
    let report = run_session(
        &fixture.paths,
        "1\nfood\n2\n".as_bytes(),
        &mut output,
    )
    .unwrap();

    assert_eq!(report.total_sorted(), 3);
    assert_eq!(report.remaining, 0);
    assert!(library.join("people").join("IMG_0001.jpg").is_file());
    assert!(library.join("food").join("img_0002.PNG").is_file());
    assert!(library.join("places").join("IMG_0003_1.jpg").is_file());
    assert_eq!(
        fs::read_to_string(library.join("places").join("IMG_0003.jpg")).unwrap(),
        "older"
    );
    assert!(camera_roll.join("readme.md").exists());
    assert!(fixture.pending_names().is_empty());

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Image 2 of 3: img_0002.PNG"));
}

#[test]
fn test_session_can_resume_after_quitting() {
    let fixture = TestFixture::new();
    fixture.add_categories(&["keep", "toss"]);
    fixture.create_images(&["1.png", "2.png", "3.png"]);

    let first = run_session(&fixture.paths, "keep\nq\n".as_bytes(), Vec::new()).unwrap();
    assert_eq!(first.total_sorted(), 1);
    assert_eq!(first.remaining, 2);
    assert_eq!(fixture.pending_names(), vec!["2.png", "3.png"]);

    let second = run_session(&fixture.paths, "2\n2\n".as_bytes(), Vec::new()).unwrap();
    assert_eq!(second.sorted.get("toss"), Some(&2));
    assert_eq!(fixture.count_sorted("keep"), 1);
    assert_eq!(fixture.count_sorted("toss"), 2);
    assert!(fixture.pending_names().is_empty());
}
