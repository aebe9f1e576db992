use ethers::contract::abigen;

abigen!(
    WeedCutterNFT,
    r#"[
        function owner() external view returns (address)
        function getUserWeapons(address user) external view returns (uint256[])
        function getWeaponDetails(uint256 tokenId) external view returns (uint256 id, string name, uint8 rarity, uint256 damageMultiplier, address owner, uint256 price, bool forSale)
    ]"#
);
