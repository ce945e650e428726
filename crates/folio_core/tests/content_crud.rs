use folio_core::{
    open_db_in_memory, BlogCategory, BlogPost, ContentKind, ContentRepository, ContentService,
    ContentServiceError, ContentValidationError, Project, RepoError, Skill,
    SqliteContentRepository,
};
use rusqlite::Connection;
use std::time::{SystemTime, UNIX_EPOCH};

fn service(conn: &Connection) -> ContentService<SqliteContentRepository<'_>> {
    ContentService::new(SqliteContentRepository::try_new(conn).unwrap())
}

fn skill(name: &str) -> Skill {
    Skill {
        name: name.to_string(),
        icon: format!("Si{name}"),
    }
}

fn post(category_id: &str) -> BlogPost {
    BlogPost {
        title: "Rust ownership in practice".to_string(),
        excerpt: "Borrowing without tears.".to_string(),
        content: "# Ownership\n\nMarkdown body.".to_string(),
        image: Some("https://cdn.example.com/ownership.png".to_string()),
        date: "2024-03-01".to_string(),
        author: "Author".to_string(),
        author_image: None,
        category_id: category_id.to_string(),
        read_time: "6 min read".to_string(),
    }
}

fn category(service: &ContentService<SqliteContentRepository<'_>>, name: &str) -> String {
    service
        .create(
            &BlogCategory {
                name: name.to_string(),
                icon: format!("Si{name}"),
            },
            None,
        )
        .unwrap()
        .id
}

fn dated_post(category_id: &str, title: &str, date: &str) -> BlogPost {
    BlogPost {
        title: title.to_string(),
        date: date.to_string(),
        ..post(category_id)
    }
}

fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

fn names(service: &ContentService<SqliteContentRepository<'_>>) -> Vec<(String, i64)> {
    service
        .list::<Skill>()
        .unwrap()
        .into_iter()
        .map(|stored| (stored.entry.name, stored.sequence))
        .collect()
}

#[test]
fn create_appends_after_existing_entries() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service.create(&skill("Rust"), None).unwrap();
    service.create(&skill("Go"), None).unwrap();
    let third = service.create(&skill("Zig"), None).unwrap();

    assert_eq!(third.sequence, 3);
    assert_eq!(
        names(&service),
        vec![
            ("Rust".to_string(), 1),
            ("Go".to_string(), 2),
            ("Zig".to_string(), 3)
        ]
    );
}

#[test]
fn list_orders_by_sequence_not_insertion() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service.create(&skill("Late"), Some(9)).unwrap();
    service.create(&skill("Early"), Some(2)).unwrap();

    let listed = names(&service);
    assert_eq!(listed[0].0, "Early");
    assert_eq!(listed[1].0, "Late");
}

#[test]
fn get_update_delete_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create(
            &Project {
                name: "Folio".to_string(),
                description: "Portfolio content store".to_string(),
                image: Some(String::new()),
                skills: vec!["Rust".to_string(), "SQLite".to_string()],
                github: Some("https://github.com/example/folio".to_string()),
                live: None,
            },
            None,
        )
        .unwrap();
    assert_eq!(created.entry.image, None);

    let mut changed = created.entry.clone();
    changed.description = "Portfolio content store with ordering".to_string();
    changed.skills.push("serde".to_string());
    let updated = service.update(&created.id, &changed).unwrap();
    assert_eq!(updated.sequence, created.sequence);
    assert_eq!(updated.entry.skills.len(), 3);
    assert_eq!(
        service.get::<Project>(&created.id).unwrap().entry,
        updated.entry
    );

    service.delete(ContentKind::Projects, &created.id).unwrap();
    assert!(matches!(
        service.get::<Project>(&created.id),
        Err(ContentServiceError::EntryNotFound {
            kind: ContentKind::Projects,
            ..
        })
    ));
}

#[test]
fn missing_ids_surface_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(matches!(
        service.update("nope", &skill("Rust")),
        Err(ContentServiceError::EntryNotFound { .. })
    ));
    assert!(matches!(
        service.delete(ContentKind::Skills, "nope"),
        Err(ContentServiceError::EntryNotFound { .. })
    ));
    assert!(matches!(
        service.move_to_sequence(ContentKind::Skills, "nope", 1),
        Err(ContentServiceError::EntryNotFound { .. })
    ));
}

#[test]
fn invalid_entries_are_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create(&skill("  "), None).unwrap_err();
    assert!(matches!(
        err,
        ContentServiceError::InvalidEntry(ContentValidationError::BlankField("name"))
    ));
    assert_eq!(
        service.repo().count_entries(ContentKind::Skills).unwrap(),
        0
    );
}

#[test]
fn blog_post_requires_existing_category() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create(&post("missing"), None).unwrap_err();
    assert!(matches!(
        err,
        ContentServiceError::MissingReference {
            kind: ContentKind::BlogCategories,
            ..
        }
    ));

    let category = service
        .create(
            &BlogCategory {
                name: "Rust".to_string(),
                icon: "SiRust".to_string(),
            },
            None,
        )
        .unwrap();
    let created = service.create(&post(&category.id), None).unwrap();
    assert_eq!(created.entry.category_id, category.id);
    assert_eq!(created.entry.content, "# Ownership\n\nMarkdown body.");
}

#[test]
fn move_to_sequence_shifts_entries_in_between() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let a = service.create(&skill("A"), None).unwrap();
    service.create(&skill("B"), None).unwrap();
    let c = service.create(&skill("C"), None).unwrap();

    assert_eq!(service.move_to_sequence(ContentKind::Skills, &a.id, 3).unwrap(), 3);
    assert_eq!(
        names(&service),
        vec![
            ("B".to_string(), 1),
            ("C".to_string(), 2),
            ("A".to_string(), 3)
        ]
    );

    // Out-of-range targets clamp to the first position.
    assert_eq!(service.move_to_sequence(ContentKind::Skills, &c.id, -5).unwrap(), 1);
    assert_eq!(
        names(&service),
        vec![
            ("C".to_string(), 1),
            ("B".to_string(), 2),
            ("A".to_string(), 3)
        ]
    );
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteContentRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
}

#[test]
fn repository_rejects_tables_without_sequence_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    folio_core::db::migrations::apply_migrations(&mut conn).unwrap();

    assert!(matches!(
        SqliteContentRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "about_items",
            column: "sequence"
        })
    ));
}

#[test]
fn corrupted_list_column_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create(
            &Project {
                name: "Broken".to_string(),
                description: "d".to_string(),
                image: None,
                skills: vec![],
                github: None,
                live: None,
            },
            None,
        )
        .unwrap();
    conn.execute(
        "UPDATE projects SET skills = 'not json' WHERE id = ?1;",
        [&created.id],
    )
    .unwrap();

    assert!(matches!(
        service.get::<Project>(&created.id),
        Err(ContentServiceError::Repo(RepoError::InvalidData(_)))
    ));
}

#[test]
fn site_root_image_paths_round_trip_through_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let category_id = category(&service, "React");

    let created = service
        .create(
            &BlogPost {
                image: Some("/blog/react-beginners-guide.jpg".to_string()),
                author_image: Some("/author-profile.jpg".to_string()),
                ..post(&category_id)
            },
            None,
        )
        .unwrap();
    let loaded = service.get::<BlogPost>(&created.id).unwrap();
    assert_eq!(
        loaded.entry.image.as_deref(),
        Some("/blog/react-beginners-guide.jpg")
    );
    assert_eq!(loaded.entry.author_image.as_deref(), Some("/author-profile.jpg"));

    // Rows written by other tools keep loading.
    conn.execute(
        "UPDATE blog_posts SET image = '/blog/a.jpg' WHERE id = ?1;",
        [&created.id],
    )
    .unwrap();
    let listed = service.list::<BlogPost>().unwrap();
    assert_eq!(listed[0].entry.image.as_deref(), Some("/blog/a.jpg"));
    let session = service.reorder_session::<BlogPost>().unwrap();
    assert_eq!(session.items().len(), 1);
}

#[test]
fn posts_by_category_filters_and_orders_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let rust = category(&service, "Rust");
    let go = category(&service, "Go");

    service
        .create(&dated_post(&rust, "January", "2024-01-10"), None)
        .unwrap();
    service
        .create(&dated_post(&go, "February", "2024-02-10"), None)
        .unwrap();
    service
        .create(&dated_post(&rust, "March", "2024-03-10"), None)
        .unwrap();

    let rust_posts = service.posts_by_category(&rust).unwrap();
    let titles = rust_posts
        .iter()
        .map(|view| view.post.entry.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["March", "January"]);
    for view in &rust_posts {
        let attached = view.category.as_ref().unwrap();
        assert_eq!(attached.id, rust);
        assert_eq!(attached.entry.name, "Rust");
    }

    assert!(service.posts_by_category("missing").unwrap().is_empty());
}

#[test]
fn blog_posts_carry_their_category_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let rust = category(&service, "Rust");
    let go = category(&service, "Go");

    let older = service
        .create(&dated_post(&go, "Older", "2023-12-01"), None)
        .unwrap();
    service
        .create(&dated_post(&rust, "Newer", "2024-05-01"), None)
        .unwrap();

    let views = service.blog_posts().unwrap();
    let listed = views
        .iter()
        .map(|view| {
            (
                view.post.entry.title.as_str(),
                view.category.as_ref().unwrap().entry.name.as_str(),
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(listed, vec![("Newer", "Rust"), ("Older", "Go")]);

    let single = service.blog_post(&older.id).unwrap();
    assert_eq!(single.post.id, older.id);
    assert_eq!(single.category.unwrap().id, go);

    let json = serde_json::to_value(service.blog_post(&older.id).unwrap()).unwrap();
    assert_eq!(json["title"], "Older");
    assert_eq!(json["category"]["name"], "Go");

    assert!(matches!(
        service.blog_post("nope"),
        Err(ContentServiceError::EntryNotFound {
            kind: ContentKind::BlogPosts,
            ..
        })
    ));
}

#[test]
fn entries_sharing_a_sequence_list_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let before = epoch_ms();
    let created = ["E", "D", "C", "B", "A"]
        .into_iter()
        .map(|name| service.create(&skill(name), Some(1)).unwrap())
        .collect::<Vec<_>>();
    let after = epoch_ms();

    for stored in &created {
        assert!(stored.created_at >= before && stored.created_at <= after);
        assert_eq!(stored.updated_at, stored.created_at);
    }
    let listed = names(&service)
        .into_iter()
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
    assert_eq!(listed, vec!["E", "D", "C", "B", "A"]);
}

#[test]
fn rows_inserted_outside_the_repository_get_millisecond_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let before = epoch_ms();
    conn.execute(
        "INSERT INTO skills (id, name, icon) VALUES ('raw', 'Raw', 'SiRaw');",
        [],
    )
    .unwrap();
    let after = epoch_ms();

    let created_at: i64 = conn
        .query_row("SELECT created_at FROM skills WHERE id = 'raw';", [], |row| {
            row.get(0)
        })
        .unwrap();
    // SQLite's clock can round a millisecond either way.
    assert!(created_at >= before - 1 && created_at <= after + 1);
}
