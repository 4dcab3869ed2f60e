use media_bucket_core::config::parse_resource_types;
use media_bucket_core::contract::ResourceType;
use media_bucket_core::filter::FolderFilter;

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_filter_keeps_only_matching_folder() {
    let filter = FolderFilter::parse("/samples/rats").expect("filter requested");
    let kept = filter.apply(urls(&[
        "https://res.example.com/demo/image/upload/v1/samples/rats/a.jpg",
        "https://res.example.com/demo/image/upload/v1/samples/birds/b.jpg",
    ]));
    assert_eq!(
        kept,
        urls(&["https://res.example.com/demo/image/upload/v1/samples/rats/a.jpg"])
    );
}

#[test]
fn test_filter_never_duplicates_urls() {
    let filter = FolderFilter::parse("/samples, /samples/rats ,rats").expect("filter requested");
    let mut kept = filter.apply(urls(&[
        "https://res.example.com/demo/image/upload/v1/samples/rats/a.jpg",
        "https://res.example.com/demo/image/upload/v1/samples/rats/a.jpg",
        "https://res.example.com/demo/image/upload/v1/samples/birds/b.jpg",
        "https://res.example.com/demo/image/upload/v1/other/c.jpg",
    ]));
    kept.sort();
    assert_eq!(
        kept,
        urls(&[
            "https://res.example.com/demo/image/upload/v1/samples/birds/b.jpg",
            "https://res.example.com/demo/image/upload/v1/samples/rats/a.jpg",
        ])
    );
}

#[test]
fn test_blank_folder_lists_request_no_filtering() {
    assert!(FolderFilter::parse("").is_none());
    assert!(FolderFilter::parse(" , ,").is_none());

    let filter = FolderFilter::parse("a, ,b").expect("filter requested");
    assert_eq!(filter.folders(), &["a".to_string(), "b".to_string()]);
}

#[test]
fn test_parse_resource_types() {
    assert_eq!(
        parse_resource_types("image,raw,video").unwrap(),
        vec![ResourceType::Image, ResourceType::Raw, ResourceType::Video]
    );
    assert_eq!(
        parse_resource_types(" Video , image,video,").unwrap(),
        vec![ResourceType::Video, ResourceType::Image]
    );
    let err = parse_resource_types("image,audio").unwrap_err();
    assert!(err.to_string().contains("audio"), "got: {err}");
}
