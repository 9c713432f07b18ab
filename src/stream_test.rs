use super::*;

fn frame(chunk: &str) -> String {
    format!("data: {}\n", serde_json::json!({ "chunk": chunk }))
}

async fn collect_deltas(packets: Vec<Result<Vec<u8>, String>>) -> Vec<Result<String, String>> {
    deltas(stream::iter(packets)).collect().await
}

// =============================================================================
// FrameDecoder
// =============================================================================

#[test]
fn push_decodes_complete_lines() {
    let mut decoder = FrameDecoder::new();
    let input = format!("{}{}", frame("Hello"), frame(" world"));
    assert_eq!(decoder.push(input.as_bytes()), vec!["Hello", " world"]);
    assert_eq!(decoder.pending_len(), 0);
}

#[test]
fn frame_split_across_packets_is_reassembled() {
    let mut decoder = FrameDecoder::new();
    let input = frame("split me");
    let (a, b) = input.as_bytes().split_at(9);

    assert!(decoder.push(a).is_empty());
    assert_eq!(decoder.pending_len(), 9);
    assert_eq!(decoder.push(b), vec!["split me"]);
}

#[test]
fn multibyte_code_point_split_across_packets_is_reassembled() {
    let mut decoder = FrameDecoder::new();
    let input = frame("कीट");
    let bytes = input.as_bytes();
    // Cut inside the first Devanagari code point (3 bytes wide).
    let cut = input.find('क').unwrap() + 1;

    assert!(decoder.push(&bytes[..cut]).is_empty());
    assert_eq!(decoder.push(&bytes[cut..]), vec!["कीट"]);
}

#[test]
fn byte_at_a_time_delivery_yields_same_deltas() {
    let mut decoder = FrameDecoder::new();
    let input = format!("{}{}", frame("a"), frame("ब"));
    let mut out = Vec::new();
    for b in input.as_bytes() {
        out.extend(decoder.push(std::slice::from_ref(b)));
    }
    assert_eq!(out, vec!["a", "ब"]);
}

#[test]
fn malformed_json_is_skipped_and_counted() {
    let mut decoder = FrameDecoder::new();
    let input = format!("data: {{broken\n{}", frame("ok"));
    assert_eq!(decoder.push(input.as_bytes()), vec!["ok"]);
    assert_eq!(decoder.malformed_frames(), 1);
}

#[test]
fn non_data_lines_and_empty_chunks_are_ignored() {
    let mut decoder = FrameDecoder::new();
    let input = format!(
        ": keep-alive\nevent: message\n\ndata: {{}}\ndata: {{\"chunk\":\"\"}}\ndata: {{\"other\":1}}\n{}",
        frame("kept")
    );
    assert_eq!(decoder.push(input.as_bytes()), vec!["kept"]);
    assert_eq!(decoder.malformed_frames(), 0);
}

#[test]
fn crlf_line_endings_are_accepted() {
    let mut decoder = FrameDecoder::new();
    assert_eq!(decoder.push(b"data: {\"chunk\":\"x\"}\r\n"), vec!["x"]);
}

#[test]
fn prefix_without_space_is_not_a_frame() {
    let mut decoder = FrameDecoder::new();
    assert!(decoder.push(b"data:{\"chunk\":\"x\"}\n").is_empty());
}

#[test]
fn finish_flushes_unterminated_final_frame() {
    let mut decoder = FrameDecoder::new();
    assert!(decoder.push(b"data: {\"chunk\":\"tail\"}").is_empty());
    assert_eq!(decoder.finish(), vec!["tail"]);
    assert!(decoder.finish().is_empty());
}

#[test]
fn finish_drops_truncated_frame() {
    let mut decoder = FrameDecoder::new();
    assert!(decoder.push(b"data: {\"chunk\":\"ta").is_empty());
    assert!(decoder.finish().is_empty());
    assert_eq!(decoder.malformed_frames(), 1);
}

// =============================================================================
// deltas()
// =============================================================================

#[tokio::test]
async fn deltas_yields_in_order_and_ends_with_stream() {
    let body = format!("{}{}{}", frame("**Pest** "), frame("Control** info"), frame("\n\n- ✨ **Aphids** *are bad*"));
    let bytes = body.into_bytes();
    let packets = bytes
        .chunks(7)
        .map(|c| Ok(c.to_vec()))
        .collect::<Vec<_>>();

    let out = collect_deltas(packets).await;
    let texts: Vec<String> = out.into_iter().map(Result::unwrap).collect();
    assert_eq!(texts, vec!["**Pest** ", "Control** info", "\n\n- ✨ **Aphids** *are bad*"]);
}

#[tokio::test]
async fn deltas_surface_transport_error_once_and_stop() {
    let packets = vec![
        Ok(frame("before").into_bytes()),
        Err("connection reset".to_owned()),
        Ok(frame("after").into_bytes()),
    ];
    let out = collect_deltas(packets).await;
    assert_eq!(out, vec![Ok("before".to_owned()), Err("connection reset".to_owned())]);
}

#[tokio::test]
async fn deltas_of_empty_body_is_empty() {
    assert!(collect_deltas(Vec::new()).await.is_empty());
}

#[tokio::test]
async fn deltas_flush_final_line_without_newline() {
    let packets = vec![Ok(b"data: {\"chunk\":\"end\"}".to_vec())];
    assert_eq!(collect_deltas(packets).await, vec![Ok("end".to_owned())]);
}
