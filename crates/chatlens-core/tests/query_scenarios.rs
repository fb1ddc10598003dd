//! Query engine scenarios against the shared conversation fixture.

mod common;

use chatlens_core::{
    facet_counts, query_archived, query_conversations, search_messages, ExcerptOptions,
    MessageSearch,
};
use chatlens_types::{
    ConversationFilter, DateFilter, ProviderFilter, RoleFilter, SearchField, SearchState, SortOrder,
};
use common::*;

#[test]
fn test_this_week_newest_orders_by_recency() {
    let (conversations, _) = load_records();
    let filter = ConversationFilter::new(DateFilter::ThisWeek, ProviderFilter::All, SortOrder::Newest);

    let result = query_conversations(&conversations, &filter, fixture_now());
    assert_eq!(ids(&result), vec![TRIP_PLANNING, CODE_REVIEW]);
}

#[test]
fn test_openai_filter_keeps_only_openai() {
    let (conversations, _) = load_records();
    let filter = ConversationFilter::new(DateFilter::ThisWeek, ProviderFilter::OpenAi, SortOrder::Newest);

    let result = query_conversations(&conversations, &filter, fixture_now());
    assert_eq!(ids(&result), vec![TRIP_PLANNING]);
}

#[test]
fn test_archive_view_only_shows_archived() {
    let (conversations, _) = load_records();
    let result = query_archived(&conversations, &ConversationFilter::default(), fixture_now());
    assert_eq!(ids(&result), vec![OLD_BUDGET]);

    let main = query_conversations(&conversations, &ConversationFilter::default(), fixture_now());
    assert!(!ids(&main).contains(&OLD_BUDGET));
    assert_eq!(main.len(), 3);
}

#[test]
fn test_sort_orders_over_fixture() {
    let (conversations, _) = load_records();
    let now = fixture_now();

    let by = |sort| {
        let filter = ConversationFilter::new(DateFilter::All, ProviderFilter::All, sort);
        ids(&query_conversations(&conversations, &filter, now))
    };

    assert_eq!(by(SortOrder::Newest), vec![TRIP_PLANNING, CODE_REVIEW, RECIPE_IDEAS]);
    assert_eq!(by(SortOrder::Oldest), vec![RECIPE_IDEAS, CODE_REVIEW, TRIP_PLANNING]);
    assert_eq!(by(SortOrder::MostActive), vec![TRIP_PLANNING, CODE_REVIEW, RECIPE_IDEAS]);
    assert_eq!(by(SortOrder::Alphabetical), vec![CODE_REVIEW, RECIPE_IDEAS, TRIP_PLANNING]);
}

#[test]
fn test_list_search_uses_system_prompt() {
    let (conversations, _) = load_records();
    let filter = ConversationFilter::default().with_search("travel");
    let result = query_conversations(&conversations, &filter, fixture_now());
    assert_eq!(ids(&result), vec![TRIP_PLANNING]);
}

#[test]
fn test_search_plan_matches_trip_planning_only() {
    let (conversations, messages) = load_records();
    let results = search_messages(
        &conversations,
        &messages,
        &MessageSearch::new("plan"),
        fixture_now(),
        ExcerptOptions::default(),
    );

    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.conversation.id == TRIP_PLANNING));
    assert!(results.iter().all(|r| r.conversation.id != CODE_REVIEW));
    // Archived "Old Budget" also mentions a plan but is never searched.
    assert!(results.iter().all(|r| r.conversation.id != OLD_BUDGET));

    let title_hit = &results[0];
    assert_eq!(title_hit.matched_field, SearchField::Title);
    assert_eq!(title_hit.message.id, LISBON_QUESTION);
    assert!(title_hit.excerpt.contains("Planning"));
    assert_eq!(title_hit.matched_text(), Some("Plan"));
}

#[test]
fn test_search_results_keep_insertion_order_without_dedup() {
    let (conversations, messages) = load_records();
    let results = search_messages(
        &conversations,
        &messages,
        &MessageSearch::new("plan"),
        fixture_now(),
        ExcerptOptions::default(),
    );

    let order: Vec<_> = results.iter().map(|r| (r.matched_field, r.message.id)).collect();
    assert_eq!(
        order,
        vec![
            (SearchField::Title, LISBON_QUESTION),
            (SearchField::Content, LISBON_QUESTION),
            (SearchField::Content, LISBON_ANSWER),
        ]
    );
}

#[test]
fn test_search_role_filter() {
    let (conversations, messages) = load_records();
    let search = MessageSearch::new("plan").with_role(RoleFilter::Assistant);
    let results = search_messages(&conversations, &messages, &search, fixture_now(), ExcerptOptions::default());

    // The title match stays; only content matches are narrowed by role.
    let order: Vec<_> = results.iter().map(|r| (r.matched_field, r.message.id)).collect();
    assert_eq!(
        order,
        vec![(SearchField::Title, LISBON_QUESTION), (SearchField::Content, LISBON_ANSWER)]
    );
    assert_eq!(results[1].matched_text(), Some("plan"));
}

#[test]
fn test_search_date_filter() {
    let (conversations, messages) = load_records();
    let search = MessageSearch::new("function").with_date(DateFilter::Today);
    let results = search_messages(&conversations, &messages, &search, fixture_now(), ExcerptOptions::default());
    assert!(results.is_empty());

    let search = MessageSearch::new("function").with_date(DateFilter::ThisWeek);
    let results = search_messages(&conversations, &messages, &search, fixture_now(), ExcerptOptions::default());
    assert_eq!(results.len(), 2);
}

#[test]
fn test_empty_query_and_no_match_are_distinct_states() {
    let (conversations, messages) = load_records();
    let run = |q: &str| {
        let results = search_messages(
            &conversations,
            &messages,
            &MessageSearch::new(q),
            fixture_now(),
            ExcerptOptions::default(),
        );
        SearchState::from_query(q, results)
    };

    assert_eq!(run(""), SearchState::Idle);
    assert_eq!(
        run("kayak"),
        SearchState::NoMatches {
            query: "kayak".to_string()
        }
    );
    assert!(matches!(run("sintra"), SearchState::Matches(r) if r.len() == 1));
}

#[test]
fn test_facets_over_fixture() {
    let (conversations, _) = load_records();
    let counts = facet_counts(&conversations, fixture_now());
    assert_eq!(counts.total, 3);
    assert_eq!(counts.provider(ProviderFilter::OpenAi), 1);
    assert_eq!(counts.provider(ProviderFilter::Anthropic), 1);
    assert_eq!(counts.provider(ProviderFilter::Google), 1);
    assert_eq!(counts.provider(ProviderFilter::Other), 0);
    assert_eq!(counts.date(DateFilter::Today), 1);
    assert_eq!(counts.date(DateFilter::ThisWeek), 2);
    assert_eq!(counts.date(DateFilter::Older), 1);
}
