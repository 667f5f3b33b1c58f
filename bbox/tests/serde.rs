use bbox::BBox3;

#[test]
fn bbox_json_array_format() {
    let bbox = BBox3::from_xyzd([10i64, 10, 0, 140, 140, 1]);
    let text = serde_json::to_string(&bbox).unwrap();
    assert_eq!(text, "[10,10,0,140,140,1]");

    let parsed: BBox3<i64> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, bbox);
}

#[test]
fn bbox_json_rejects_negative_extent() {
    let result: Result<BBox3<i64>, _> = serde_json::from_str("[0, 0, 0, -140, 140, 1]");
    assert!(result.is_err());

    let result: Result<BBox3<i64>, _> = serde_json::from_str("[0, 0, 0, 140, 140]");
    assert!(result.is_err());
}
