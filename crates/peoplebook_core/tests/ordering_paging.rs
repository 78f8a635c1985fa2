use peoplebook_core::db::open_db_in_memory;
use peoplebook_core::{OrderSpec, PageWindow, Person, RepoError, Repository, Scope};
use rusqlite::Connection;

fn seed_ages(conn: &Connection, ages: &[i64]) {
    let scope = Scope::new(conn);
    let repo = Repository::<Person>::try_new(&scope).unwrap();
    for (index, age) in ages.iter().enumerate() {
        let id = index as i64 + 1;
        repo.persist(&Person::new(id, format!("p{id}"), *age, 'F'))
            .unwrap();
    }
}

fn ages(people: &[Person]) -> Vec<i64> {
    people.iter().map(|person| person.age.unwrap()).collect()
}

#[test]
fn ordering_ascending_and_descending_by_age() {
    let conn = open_db_in_memory().unwrap();
    seed_ages(&conn, &[30, 10, 20]);
    let scope = Scope::new(&conn);
    let repo = Repository::<Person>::try_new(&scope).unwrap();

    let ascending = repo.find_all_ordered(&OrderSpec::ascending(["age"])).unwrap();
    assert_eq!(ages(&ascending), vec![10, 20, 30]);

    let descending = repo
        .find_all_ordered(&OrderSpec::descending(["age"]))
        .unwrap();
    assert_eq!(ages(&descending), vec![30, 20, 10]);
}

#[test]
fn multi_field_ordering_shares_one_direction() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::new(&conn);
    let repo = Repository::<Person>::try_new(&scope).unwrap();

    repo.persist(&Person::new(1, "Ana", 30, 'F')).unwrap();
    repo.persist(&Person::new(2, "Ana", 20, 'F')).unwrap();
    repo.persist(&Person::new(3, "Beto", 20, 'M')).unwrap();

    let listed = repo
        .find_all_ordered(&OrderSpec::descending(["name", "age"]))
        .unwrap();
    let ids: Vec<i64> = listed.iter().map(|person| person.id.unwrap()).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn pagination_skips_offset_and_bounds_count() {
    let conn = open_db_in_memory().unwrap();
    seed_ages(&conn, &[50, 51, 52, 53, 54]);
    let scope = Scope::new(&conn);
    let repo = Repository::<Person>::try_new(&scope).unwrap();

    let page = repo.find_all_page(PageWindow::new(1, 2)).unwrap();
    assert_eq!(page.len(), 2);
    let ids: Vec<i64> = page.iter().map(|person| person.id.unwrap()).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn pagination_combined_with_ordering() {
    let conn = open_db_in_memory().unwrap();
    seed_ages(&conn, &[30, 10, 20, 40, 50]);
    let scope = Scope::new(&conn);
    let repo = Repository::<Person>::try_new(&scope).unwrap();

    let page = repo
        .find_all_page_ordered(PageWindow::new(1, 2), &OrderSpec::ascending(["age"]))
        .unwrap();
    assert_eq!(ages(&page), vec![20, 30]);
}

#[test]
fn pagination_past_the_end_returns_an_empty_page() {
    let conn = open_db_in_memory().unwrap();
    seed_ages(&conn, &[30, 10]);
    let scope = Scope::new(&conn);
    let repo = Repository::<Person>::try_new(&scope).unwrap();

    let page = repo.find_all_page(PageWindow::new(10, 5)).unwrap();
    assert!(page.is_empty());
}

#[test]
fn unknown_ordering_field_fails_validation_before_the_store() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::new(&conn);
    let repo = Repository::<Person>::try_new(&scope).unwrap();

    let err = repo
        .find_all_ordered(&OrderSpec::ascending(["nonexistent_field"]))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn zero_limit_window_fails_validation() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::new(&conn);
    let repo = Repository::<Person>::try_new(&scope).unwrap();

    let err = repo.find_all_page(PageWindow::new(0, 0)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}
