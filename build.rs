fn main() {
    // Protobuf messages are plain prost structs in `src/rpc/proto.rs`;
    // only the service plumbing is generated.
    let unary = |name: &str, route: &str, input: &str, output: &str| {
        tonic_build::manual::Method::builder()
            .name(name)
            .route_name(route)
            .input_type(input)
            .output_type(output)
            .codec_path("tonic::codec::ProstCodec")
    };

    let service = tonic_build::manual::Service::builder()
        .name("ItemService")
        .package("items")
        .method(
            unary(
                "create_item",
                "CreateItem",
                "crate::rpc::proto::ItemRequest",
                "crate::rpc::proto::ItemResponse",
            )
            .build(),
        )
        .method(
            unary(
                "update_item",
                "UpdateItem",
                "crate::rpc::proto::ItemRequest",
                "crate::rpc::proto::ItemResponse",
            )
            .build(),
        )
        .method(
            unary(
                "delete_item",
                "DeleteItem",
                "crate::rpc::proto::ItemRequest",
                "crate::rpc::proto::ItemResponse",
            )
            .build(),
        )
        .method(
            unary(
                "get_item_by_id",
                "GetItemById",
                "crate::rpc::proto::ItemRequest",
                "crate::rpc::proto::ItemResponse",
            )
            .build(),
        )
        .method(
            unary(
                "list_all_items",
                "ListAllItems",
                "crate::rpc::proto::Empty",
                "crate::rpc::proto::ItemResponse",
            )
            .server_streaming()
            .build(),
        )
        .method(
            unary(
                "add_items",
                "AddItems",
                "crate::rpc::proto::ItemRequest",
                "crate::rpc::proto::ItemsAddedResult",
            )
            .client_streaming()
            .build(),
        )
        .method(
            unary(
                "chat_about_items",
                "ChatAboutItems",
                "crate::rpc::proto::ChatMessage",
                "crate::rpc::proto::ChatMessage",
            )
            .client_streaming()
            .server_streaming()
            .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
